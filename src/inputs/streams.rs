use std::path::Path;

use crate::domain::StreamDescriptor;
use crate::error::InputError;

/// Reads stream descriptors from `path`: alternating `<stream id>` and
/// `<connection string>` lines.
///
/// # Errors
///
/// Returns an error when the file cannot be read, a stream id has no
/// connection line after it, or no streams are listed.
pub fn load_stream_descriptors(path: &Path) -> Result<Vec<StreamDescriptor>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|err| InputError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    parse_stream_descriptors(path, &content)
}

/// Parses the alternating-line stream format; blank lines are skipped.
///
/// # Errors
///
/// Returns an error when a stream id is left without a connection line or
/// when the content lists no streams.
pub fn parse_stream_descriptors(
    path: &Path,
    content: &str,
) -> Result<Vec<StreamDescriptor>, InputError> {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());
    let mut descriptors = Vec::new();

    while let Some(stream_id) = lines.next() {
        let connection = lines
            .next()
            .ok_or_else(|| InputError::MissingConnectionString {
                path: path.to_path_buf(),
                topic: stream_id.to_owned(),
            })?;
        descriptors.push(StreamDescriptor::new(
            stream_id.to_owned(),
            connection.to_owned(),
        ));
    }

    if descriptors.is_empty() {
        return Err(InputError::StreamsEmpty {
            path: path.to_path_buf(),
        });
    }
    Ok(descriptors)
}
