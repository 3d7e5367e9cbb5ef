pub type CmdResult<T> = sitekit::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod index;
pub mod theme;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (sitekit::Result<serde_json::Value>, i32) {
    crate::tty::status("sitekit is working...");

    match command {
        crate::Commands::Index(args) => dispatch!(args, global, index),
        crate::Commands::Theme(args) => dispatch!(args, global, theme),
    }
}
