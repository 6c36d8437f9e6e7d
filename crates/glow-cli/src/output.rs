//! Output files written next to the script (or into `--out-dir`).

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use glow_compiler::Compiled;
use glow_types::DeviceConfig;

/// Hex-encoded control packets plus the device they were built for.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketFile<'a> {
    pub device: &'a DeviceConfig,
    pub image_sha256: String,
    pub pause: String,
    pub resume: String,
    pub restart: String,
    pub store: String,
}

impl<'a> PacketFile<'a> {
    pub fn new(compiled: &'a Compiled, image_sha256: String) -> Self {
        let packets = &compiled.show.packets;
        Self {
            device: &compiled.device,
            image_sha256,
            pause: hex::encode(&packets.pause),
            resume: hex::encode(&packets.resume),
            restart: hex::encode(&packets.restart),
            store: hex::encode(&packets.store),
        }
    }
}

/// Where each artifact of one compilation goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub image: PathBuf,
    pub packets: PathBuf,
    pub listing: PathBuf,
}

impl OutputPaths {
    /// `show.glow` becomes `show.bin`, `show.packets.json` and `show.lst`.
    pub fn for_input(input: &Path, out_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map_or_else(|| "lightshow".into(), |s| s.to_string_lossy().into_owned());
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Self {
            image: dir.join(format!("{stem}.bin")),
            packets: dir.join(format!("{stem}.packets.json")),
            listing: dir.join(format!("{stem}.lst")),
        }
    }
}

/// Write the image, the packet file and (if rendered) the listing.
pub fn write_all(paths: &OutputPaths, compiled: &Compiled, image_sha256: String) -> Result<()> {
    if let Some(parent) = paths.image.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    std::fs::write(&paths.image, &compiled.show.image)
        .with_context(|| format!("Failed to write {}", paths.image.display()))?;

    let packets = serde_json::to_string_pretty(&PacketFile::new(compiled, image_sha256))?;
    std::fs::write(&paths.packets, packets)
        .with_context(|| format!("Failed to write {}", paths.packets.display()))?;

    if let Some(listing) = &compiled.listing {
        std::fs::write(&paths.listing, listing)
            .with_context(|| format!("Failed to write {}", paths.listing.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_sit_next_to_input() {
        let paths = OutputPaths::for_input(Path::new("shows/demo.glow"), None);
        assert_eq!(paths.image, Path::new("shows/demo.bin"));
        assert_eq!(paths.packets, Path::new("shows/demo.packets.json"));
        assert_eq!(paths.listing, Path::new("shows/demo.lst"));
    }

    #[test]
    fn out_dir_replaces_parent() {
        let paths = OutputPaths::for_input(Path::new("shows/demo.glow"), Some(Path::new("build")));
        assert_eq!(paths.image, Path::new("build/demo.bin"));
    }

    #[test]
    fn bare_file_name_stays_relative() {
        let paths = OutputPaths::for_input(Path::new("demo.glow"), None);
        assert_eq!(paths.image, Path::new("demo.bin"));
    }
}
