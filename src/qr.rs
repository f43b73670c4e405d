use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

/// Public page a record's QR code points at.
pub fn view_url(frontend_url: &str, unique_id: &str) -> String {
    format!("{}/view/{}", frontend_url.trim_end_matches('/'), unique_id)
}

/// Encode `url` as a QR code and return it as an embeddable `data:` URL.
///
/// High error correction, black on white, with the standard quiet zone.
pub fn data_url(url: &str) -> Result<String> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::H)
        .context("Failed to encode QR code")?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_url() {
        assert_eq!(
            view_url("http://localhost:3000", "abc-123"),
            "http://localhost:3000/view/abc-123"
        );
        assert_eq!(
            view_url("https://meds.example.com/", "x"),
            "https://meds.example.com/view/x"
        );
    }

    #[test]
    fn test_data_url_is_base64_svg() {
        let url = data_url("http://localhost:3000/view/abc").expect("qr");
        let encoded = url
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data url prefix");

        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
        assert!(svg.contains("#ffffff"));
    }

    #[test]
    fn test_data_url_is_deterministic() {
        let a = data_url("http://localhost:3000/view/same").unwrap();
        let b = data_url("http://localhost:3000/view/same").unwrap();
        let c = data_url("http://localhost:3000/view/other").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_data_url_rejects_oversized_payload() {
        // Level H tops out well below 2 KB of binary data
        let huge = "x".repeat(4000);
        assert!(data_url(&huge).is_err());
    }
}
