//! Scannable rendering of credentials.
//!
//! Tokens are rendered as PNG-encoded QR symbols. Rendering is a pure
//! function of the token string.

use crate::credential::CredentialToken;
use crate::error::{GatePassError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Smallest module size, in pixels, of the rendered symbol.
const MODULE_PIXELS: u32 = 8;

/// PNG bytes of a rendered credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedCode(Vec<u8>);

impl RenderedCode {
    /// Wrap PNG bytes read back from storage.
    #[must_use]
    pub const fn from_png(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw PNG bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `data:` URL suitable for embedding in a page or an email.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.0))
    }
}

impl std::fmt::Debug for RenderedCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RenderedCode({} bytes)", self.0.len())
    }
}

/// Render a credential token as a PNG QR code.
///
/// # Errors
///
/// Returns [`GatePassError::Rendering`] if the token does not fit in a QR
/// symbol or PNG encoding fails.
pub fn render(token: &CredentialToken) -> Result<RenderedCode> {
    let code = QrCode::with_error_correction_level(token.as_str().as_bytes(), EcLevel::M)
        .map_err(|e| GatePassError::Rendering(format!("QR encoding failed: {e}")))?;

    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .build();

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| GatePassError::Rendering(format!("PNG encoding failed: {e}")))?;

    Ok(RenderedCode(png))
}
