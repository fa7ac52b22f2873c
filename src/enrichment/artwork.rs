//! Deterministic artwork synthesis (spec §4.7 step 3). Generates a small
//! content-addressed PNG per channel for each of logo / background / poster,
//! named `{slug}_{hash8}.png` where `hash8` is the first 8 hex chars of
//! `sha2::Sha256(channel.id)`. Re-running against the same id always yields
//! the same filename and, because generation is pure, the same bytes.

use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb, RgbImage};
use sha2::{Digest, Sha256};

use crate::errors::{AppResult, FilesystemError};
use crate::models::Channel;
use crate::utils::slugify;

pub struct ArtworkPaths {
    pub logo: String,
    pub background: String,
    pub poster: String,
}

pub struct ArtworkGenerator {
    root: PathBuf,
}

impl ArtworkGenerator {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub async fn synthesize_all(&self, channel: &Channel) -> AppResult<ArtworkPaths> {
        let hash8 = hash8_of(&channel.id);
        let slug = slugify(&channel.name);
        let filename = format!("{slug}_{hash8}.png");

        let logo = self.synthesize_one("logo", &filename, &channel.id, (64, 64)).await?;
        let background =
            self.synthesize_one("background", &filename, &channel.id, (320, 180)).await?;
        let poster = self.synthesize_one("poster", &filename, &channel.id, (120, 160)).await?;

        Ok(ArtworkPaths {
            logo: logo.display().to_string(),
            background: background.display().to_string(),
            poster: poster.display().to_string(),
        })
    }

    async fn synthesize_one(
        &self,
        kind: &str,
        filename: &str,
        channel_id: &str,
        size: (u32, u32),
    ) -> AppResult<PathBuf> {
        let dir = self.root.join(kind);
        let path = dir.join(filename);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(path);
        }

        tokio::fs::create_dir_all(&dir).await.map_err(|source| FilesystemError::Write {
            path: dir.display().to_string(),
            source,
        })?;

        let channel_id = channel_id.to_string();
        let write_path = path.clone();
        tokio::task::spawn_blocking(move || render_and_write(&write_path, &channel_id, size))
            .await
            .map_err(|e| FilesystemError::Sandbox { path: path.display().to_string(), message: e.to_string() })?
            .map_err(|source| FilesystemError::Write { path: path.display().to_string(), source })?;

        Ok(path)
    }
}

fn render_and_write(path: &Path, channel_id: &str, size: (u32, u32)) -> std::io::Result<()> {
    let image = render(channel_id, size);
    image.save(path).map_err(|e| std::io::Error::other(e.to_string()))
}

/// Solid color field (from the id's hash) with a deterministic geometric
/// glyph grid overlaid; not real font shaping (out of scope, spec §4.7).
fn render(channel_id: &str, (width, height): (u32, u32)) -> RgbImage {
    let digest = Sha256::digest(channel_id.as_bytes());
    let base = Rgb([digest[0], digest[1], digest[2]]);
    let accent = Rgb([digest[3], digest[4], digest[5]]);

    ImageBuffer::from_fn(width, height, |x, y| {
        let cell = 8u32;
        let on = ((x / cell) + (y / cell)) % 2 == (digest[6] % 2) as u32;
        if on {
            accent
        } else {
            base
        }
    })
}

fn hash8_of(id: &str) -> String {
    let digest = Sha256::digest(id.as_bytes());
    hex::encode(&digest[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash8_is_deterministic() {
        assert_eq!(hash8_of("abc"), hash8_of("abc"));
        assert_ne!(hash8_of("abc"), hash8_of("abd"));
    }

    #[test]
    fn render_is_deterministic() {
        let a = render("chan-1", (16, 16));
        let b = render("chan-1", (16, 16));
        assert_eq!(a.into_raw(), b.into_raw());
    }
}
