//! Artifact fingerprints.
//!
//! Four digests are computed in-process and each is written to a sidecar
//! file next to the artifact, in the binary-mode line format of the
//! coreutils `*sum` tools: `<hex> *<path>\n`.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use blake2::Blake2b512;
use digest::Digest;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{BuildError, BuildResult};
use crate::layout;

const READ_CHUNK: usize = 64 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Blake2,
}

impl DigestAlgorithm {
    pub const ALL: [Self; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Blake2];

    /// Sidecar file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Blake2 => "blake2",
        }
    }

    /// Lowercase hex digest of everything `reader` yields.
    pub fn hex_digest(self, reader: impl Read) -> std::io::Result<String> {
        match self {
            Self::Md5 => hash_reader::<Md5>(reader),
            Self::Sha1 => hash_reader::<Sha1>(reader),
            Self::Sha256 => hash_reader::<Sha256>(reader),
            Self::Blake2 => hash_reader::<Blake2b512>(reader),
        }
    }
}

/// One computed digest and where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub algorithm: DigestAlgorithm,
    pub hex: String,
    pub sidecar: PathBuf,
}

/// Hash `artifact` with every algorithm and write the sidecars.
///
/// `sidecar_for` maps an extension to the sidecar path.
pub fn write_sidecars(
    artifact: &Path,
    sidecar_for: impl Fn(&str) -> PathBuf,
) -> BuildResult<Vec<FileDigest>> {
    let sidecars: Vec<_> = DigestAlgorithm::ALL
        .into_iter()
        .map(|algorithm| (algorithm, sidecar_for(algorithm.extension())))
        .collect();
    for (_, sidecar) in &sidecars {
        layout::require_writable_file(sidecar)?;
    }

    log::info!("Computing hashes of \"{}\"", artifact.display());
    sidecars
        .into_iter()
        .map(|(algorithm, sidecar)| {
            let file = File::open(artifact).map_err(BuildError::io(artifact))?;
            let hex = algorithm
                .hex_digest(file)
                .map_err(BuildError::io(artifact))?;
            let line = format!("{hex} *{}\n", artifact.display());
            std::fs::write(&sidecar, line).map_err(BuildError::io(&sidecar))?;
            log::debug!("{} {hex}", algorithm.extension());
            Ok(FileDigest {
                algorithm,
                hex,
                sidecar,
            })
        })
        .collect()
}

fn hash_reader<D: Digest>(mut reader: impl Read) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    let mut hex = String::with_capacity(<D as Digest>::output_size() * 2);
    for byte in hasher.finalize().iter() {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}
