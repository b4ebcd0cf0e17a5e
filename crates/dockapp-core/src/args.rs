const ARGS_SEPARATOR: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitArgs<'a> {
    pub source: Option<&'a str>,
    pub run_args: &'a [String],
    pub launch_args: &'a [String],
}

/// Splits `[URL, rest...]` at the first bare `--` in `rest`.
///
/// Everything before the separator is the container command, everything
/// after it is handed to the launched app.
pub fn split_args(args: &[String]) -> SplitArgs<'_> {
    let Some((source, rest)) = args.split_first() else {
        return SplitArgs {
            source: None,
            run_args: &[],
            launch_args: &[],
        };
    };

    match rest.iter().position(|arg| arg == ARGS_SEPARATOR) {
        Some(index) => SplitArgs {
            source: Some(source.as_str()),
            run_args: &rest[..index],
            launch_args: &rest[index + 1..],
        },
        None => SplitArgs {
            source: Some(source.as_str()),
            run_args: rest,
            launch_args: &[],
        },
    }
}
