use clap::Parser;

use crate::error::{AppError, AppResult};

use super::LatencyArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<LatencyArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    LatencyArgs::try_parse_from(args).map_err(AppError::from)
}
