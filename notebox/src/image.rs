//! Image attachments, embedded as Base64 data URLs.
use crate::errors::ImageError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::Path;

/// Raster formats accepted as attachments, recognised by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    fn accepts_mime(&self, mime: &str) -> bool {
        let mime = mime.to_ascii_lowercase();
        match self {
            ImageFormat::Jpeg => matches!(mime.as_str(), "image/jpeg" | "image/jpg" | "image/pjpeg"),
            ImageFormat::Bmp => matches!(mime.as_str(), "image/bmp" | "image/x-ms-bmp"),
            _ => mime == self.mime_type(),
        }
    }
}

/// A validated `data:image/...;base64,...` URL.
///
/// Only constructed from a recognised image payload, so the string holds nothing
/// but a known MIME type and Base64 characters and is safe inside a quoted `src`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DataUrl {
    url: String,
    format: ImageFormat,
}

impl DataUrl {
    /// Embed raw image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let format = ImageFormat::sniff(bytes).ok_or(ImageError::UnsupportedFormat)?;
        let url = format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes));
        Ok(DataUrl { url, format })
    }

    /// Validate a data URL produced elsewhere, e.g. by a browser file reader.
    pub fn parse(url: &str) -> Result<Self, ImageError> {
        let rest = url.strip_prefix("data:").ok_or(ImageError::NotADataURL)?;
        let (mime, payload) = rest.split_once(";base64,").ok_or(ImageError::NotADataURL)?;
        let bytes = STANDARD.decode(payload)?;
        let format = ImageFormat::sniff(&bytes).ok_or(ImageError::UnsupportedFormat)?;
        if !format.accepts_mime(mime) {
            return Err(ImageError::MimeMismatch {
                declared: mime.to_owned(),
                detected: format.mime_type(),
            });
        }
        Ok(DataUrl {
            url: url.to_owned(),
            format,
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Size of the embedded image in bytes.
    pub fn decoded_len(&self) -> usize {
        let payload = self.url.len() - self.payload_offset();
        let padding = self.url.bytes().rev().take_while(|b| *b == b'=').count();
        payload / 4 * 3 - padding
    }

    /// Refuse images whose decoded size exceeds `limit` bytes.
    pub fn check_size(&self, limit: usize) -> Result<(), ImageError> {
        let size = self.decoded_len();
        if size > limit {
            return Err(ImageError::TooLarge { size, limit });
        }
        Ok(())
    }

    fn payload_offset(&self) -> usize {
        // Guaranteed present by construction
        self.url.find(";base64,").map_or(0, |i| i + ";base64,".len())
    }
}

impl Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl AsRef<str> for DataUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl From<DataUrl> for String {
    fn from(url: DataUrl) -> String {
        url.url
    }
}

impl TryFrom<String> for DataUrl {
    type Error = ImageError;

    fn try_from(url: String) -> Result<Self, Self::Error> {
        DataUrl::parse(&url)
    }
}

impl TryFrom<&str> for DataUrl {
    type Error = ImageError;

    fn try_from(url: &str) -> Result<Self, Self::Error> {
        DataUrl::parse(url)
    }
}

/// Read an image file and embed it as a data URL.
///
/// Files larger than `max_bytes` are refused before being encoded.
pub async fn convert_file<P: AsRef<Path>>(
    path: P,
    max_bytes: Option<usize>,
) -> Result<DataUrl, ImageError> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    if let Some(limit) = max_bytes {
        if bytes.len() > limit {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
    }
    DataUrl::from_bytes(&bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env;
    use uuid::Uuid;

    pub(crate) const TINY_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

    pub(crate) fn tiny_gif() -> DataUrl {
        DataUrl::from_bytes(TINY_GIF).unwrap()
    }

    #[test]
    fn sniff_formats() {
        assert_eq!(ImageFormat::sniff(TINY_GIF), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"\x89PNG\r\n\x1a\n\x00\x00"),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::sniff(&[0xff, 0xd8, 0xff, 0xe0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"<svg onload=alert(1)>"), None);
    }

    #[test]
    fn encode_bytes() {
        let url = tiny_gif();
        assert!(url.as_str().starts_with("data:image/gif;base64,R0lGODlh"));
        assert_eq!(url.decoded_len(), TINY_GIF.len());
        assert_eq!(DataUrl::parse(url.as_str()).unwrap(), url);
    }

    #[test]
    fn reject_bad_urls() {
        assert!(matches!(
            DataUrl::parse("https://example.com/cat.png"),
            Err(ImageError::NotADataURL)
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png,rawbytes"),
            Err(ImageError::NotADataURL)
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64,!!!"),
            Err(ImageError::Base64(_))
        ));
        assert!(matches!(
            DataUrl::parse("data:text/html;base64,PHNjcmlwdD4="),
            Err(ImageError::UnsupportedFormat)
        ));
        let gif = tiny_gif().to_string().replace("image/gif", "image/png");
        assert!(matches!(
            DataUrl::parse(&gif),
            Err(ImageError::MimeMismatch { .. })
        ));
        let injected = tiny_gif()
            .to_string()
            .replace("image/gif", "image/gif\" onerror=\"alert(1)");
        assert!(DataUrl::parse(&injected).is_err());
    }

    #[test]
    fn size_limit() {
        let url = tiny_gif();
        assert!(url.check_size(TINY_GIF.len()).is_ok());
        assert!(matches!(
            url.check_size(TINY_GIF.len() - 1),
            Err(ImageError::TooLarge { size, limit }) if size == TINY_GIF.len() && limit == TINY_GIF.len() - 1
        ));
    }

    #[test]
    fn serde_as_string() {
        let url = tiny_gif();
        let json = serde_json::to_string(&url).unwrap();
        assert_eq!(json, format!("\"{}\"", url));
        let back: DataUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, url);
        assert!(serde_json::from_str::<DataUrl>("\"not a url\"").is_err());
    }

    #[tokio::test]
    async fn convert_image_file() {
        let path = env::temp_dir().join(format!("notebox-{}.gif", Uuid::new_v4()));
        tokio::fs::write(&path, TINY_GIF).await.unwrap();
        let url = convert_file(&path, None).await.unwrap();
        assert_eq!(url, tiny_gif());
        assert!(matches!(
            convert_file(&path, Some(8)).await,
            Err(ImageError::TooLarge { limit: 8, .. })
        ));
        tokio::fs::remove_file(&path).await.unwrap();
        assert!(matches!(
            convert_file(&path, None).await,
            Err(ImageError::IOError(_))
        ));
    }
}
