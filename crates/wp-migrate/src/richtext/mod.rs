//! Rich-text conversion from WordPress HTML to portable blocks.
//!
//! [`convert`] parses the HTML, resolves every image placeholder through the
//! [`MediaResolver`] with a small concurrency bound of its own, drops blank
//! text blocks and makes sure every block has a key.

pub mod parser;

pub use parser::parse_html;

use tracing::debug;

use crate::concurrency::{first_failure, run_bounded};
use crate::error::Result;
use crate::media::MediaResolver;
use crate::model::{ImageBlock, PortableBlock};

/// Default number of images resolved at once within one document.
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 2;

/// Converts an HTML fragment into portable blocks.
///
/// Images that cannot be matched or uploaded stay as `externalImage`
/// placeholders.
///
/// # Errors
///
/// Returns the first image lookup error after all lookups have finished.
pub async fn convert(
    html: &str,
    resolver: &MediaResolver,
    image_concurrency: usize,
) -> Result<Vec<PortableBlock>> {
    let mut blocks = parse_html(html);

    let placeholders: Vec<(usize, String)> = blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| match block {
            PortableBlock::ExternalImage(image) => Some((index, image.url.clone())),
            _ => None,
        })
        .collect();

    if !placeholders.is_empty() {
        debug!("Resolving {} embedded images", placeholders.len());

        let tasks: Vec<_> = placeholders
            .iter()
            .map(|(_, url)| {
                let resolver = resolver.clone();
                let url = url.clone();
                async move { resolver.resolve(&url).await }
            })
            .collect();
        let resolved = first_failure(run_bounded(image_concurrency, tasks).await)?;

        for ((index, _), asset_id) in placeholders.into_iter().zip(resolved) {
            let Some(asset_id) = asset_id else {
                continue;
            };
            let key = blocks[index].key().map(str::to_string);
            blocks[index] = PortableBlock::Image(ImageBlock::from_asset(key, asset_id));
        }
    }

    blocks.retain(|block| !block.is_blank_text());
    for block in &mut blocks {
        block.ensure_key();
    }
    Ok(blocks)
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
