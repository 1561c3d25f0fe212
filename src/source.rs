//! Reading env documents from disk.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::{Encoding, EnvMap};
use crate::parser::parse;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_FILENAME: &str = ".env";

const UTF8_BOM: &str = "\u{feff}";

/// `DEFAULT_FILENAME` in the current working directory.
pub fn default_path() -> Result<PathBuf, Error> {
    Ok(std::env::current_dir()?.join(DEFAULT_FILENAME))
}

/// Read and parse the document at `path`.
pub fn read(path: impl AsRef<Path>, encoding: Encoding) -> Result<EnvMap, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    parse_file_contents(&bytes, path, encoding)
}

/// Read and parse the document at `path` without blocking the runtime.
#[cfg(feature = "async")]
pub async fn read_async(path: impl AsRef<Path>, encoding: Encoding) -> Result<EnvMap, Error> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    parse_file_contents(&bytes, path, encoding)
}

fn parse_file_contents(bytes: &[u8], path: &Path, encoding: Encoding) -> Result<EnvMap, Error> {
    let content = decode(bytes, encoding)?;
    let mut map = parse(&content)?;
    map.set_source(path);
    Ok(map)
}

pub(crate) fn decode(bytes: &[u8], encoding: Encoding) -> Result<Cow<'_, str>, Error> {
    match encoding {
        Encoding::Utf8 => {
            let text = std::str::from_utf8(bytes)?;
            Ok(Cow::Borrowed(text.strip_prefix(UTF8_BOM).unwrap_or(text)))
        }
        Encoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&byte| char::from(byte)).collect())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_is_stripped() {
        let text = decode(b"\xef\xbb\xbfA=1", Encoding::Utf8).expect("decode should succeed");
        assert_eq!(text, "A=1");
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        let text = decode(b"NAME=caf\xe9", Encoding::Latin1).expect("decode should succeed");
        assert_eq!(text, "NAME=café");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = decode(b"A=\xc3", Encoding::Utf8).expect_err("expected encoding error");
        assert!(matches!(err, Error::InvalidEncoding(_)), "{err:?}");
    }

    #[test]
    fn default_path_points_at_dotenv_in_cwd() {
        let path = default_path().expect("cwd should be readable");
        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some(".env"));
    }
}
