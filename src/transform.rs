use tracing::{debug, trace};

use crate::buffer;
use crate::codec::Format;
use crate::config::CompressionConfig;
use crate::error::CompressError;
use crate::stream;
use crate::unit::{Content, Unit};

/// Processes one unit, replacing its contents with a compressed encoding
/// when the configuration calls for it.
///
/// Units without contents pass through untouched. For everything else the
/// format name is resolved up front, so a bad name fails the unit even when
/// the threshold would have skipped compression, in both representations.
/// When compression ran and `append` is enabled, the format's canonical
/// suffix is added to the unit's path; the path, metadata and content
/// representation are otherwise preserved.
///
/// Units are processed independently; an error drops only the unit that
/// caused it.
pub async fn transform(mut unit: Unit, config: &CompressionConfig) -> Result<Unit, CompressError> {
    let contents = std::mem::replace(&mut unit.content, Content::Empty);

    let (content, format, was_compressed) = match contents {
        Content::Empty => {
            trace!(path = %unit.path, "no contents, forwarding unchanged");
            return Ok(unit);
        }
        Content::Buffer(contents) => {
            let format = Format::from_name(&config.format)?;
            let outcome = buffer::compress(contents, format, config)?;
            (
                Content::Buffer(outcome.contents),
                format,
                outcome.was_compressed,
            )
        }
        Content::Stream(contents) => {
            let format = Format::from_name(&config.format)?;
            let outcome = stream::compress(contents, format, config).await?;
            (
                Content::Stream(outcome.contents),
                format,
                outcome.was_compressed,
            )
        }
    };

    unit.content = content;
    if config.append && was_compressed {
        unit.path.push_str(format.suffix());
    }

    debug!(
        path = %unit.path,
        format = format.name(),
        was_compressed,
        "unit processed"
    );
    Ok(unit)
}
