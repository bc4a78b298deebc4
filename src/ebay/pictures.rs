//! eBay Picture Service (EPS) upload
//!
//! Uploads images through the Trading API `UploadSiteHostedPictures`
//! call and returns the hosted URL. The request is a small fixed XML
//! document, built and parsed with plain text handling.

use crate::error::{ListerError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;

const TRADING_API_URL: &str = "https://api.ebay.com/ws/api.dll";
const SITE_ID: &str = "3"; // UK
const COMPAT_LEVEL: &str = "1147";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

lazy_static! {
    static ref ACK_RE: Regex = Regex::new(r"<Ack>([^<]*)</Ack>").expect("ack regex");
    static ref FULL_URL_RE: Regex =
        Regex::new(r"<FullURL>([^<]*)</FullURL>").expect("full url regex");
    static ref LONG_MESSAGE_RE: Regex =
        Regex::new(r"<LongMessage>([^<]*)</LongMessage>").expect("long message regex");
}

/// Uploads one image and returns its public EPS URL.
pub async fn upload_image(
    client: &reqwest::Client,
    token: &str,
    image_bytes: &[u8],
    image_name: &str,
    verbose: bool,
) -> Result<String> {
    if verbose {
        println!(
            "  [eps] uploading {} ({} bytes)",
            image_name,
            image_bytes.len()
        );
    }

    let b64_image = BASE64.encode(image_bytes);
    let xml_request = build_upload_request(token, &b64_image, image_name);

    let response = client
        .post(TRADING_API_URL)
        .header("X-EBAY-API-CALL-NAME", "UploadSiteHostedPictures")
        .header("X-EBAY-API-SITEID", SITE_ID)
        .header("X-EBAY-API-COMPATIBILITY-LEVEL", COMPAT_LEVEL)
        .header("X-EBAY-API-IAF-TOKEN", token)
        .header("Content-Type", "text/xml; charset=utf-8")
        .timeout(UPLOAD_TIMEOUT)
        .body(xml_request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ListerError::EpsUpload(format!(
            "HTTP {} from picture service",
            status
        )));
    }

    parse_upload_response(&text)
}

/// Uploads images in order, failing on the first error.
pub async fn upload_images(
    client: &reqwest::Client,
    token: &str,
    images: &[(Vec<u8>, String)],
    verbose: bool,
) -> Result<Vec<String>> {
    let mut urls = Vec::with_capacity(images.len());

    for (i, (image_bytes, image_name)) in images.iter().enumerate() {
        let url = upload_image(client, token, image_bytes, image_name, verbose)
            .await
            .map_err(|e| {
                ListerError::EpsUpload(format!(
                    "failed to upload image {}/{}: {}",
                    i + 1,
                    images.len(),
                    e
                ))
            })?;
        urls.push(url);
    }

    Ok(urls)
}

fn build_upload_request(token: &str, b64_image: &str, image_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<UploadSiteHostedPicturesRequest xmlns="urn:ebay:apis:eBLBaseComponents">
    <RequesterCredentials>
        <eBayAuthToken>{}</eBayAuthToken>
    </RequesterCredentials>
    <WarningLevel>High</WarningLevel>
    <PictureData>{}</PictureData>
    <PictureName>{}</PictureName>
    <PictureSet>Supersize</PictureSet>
</UploadSiteHostedPicturesRequest>"#,
        escape_xml(token),
        b64_image,
        escape_xml(image_name)
    )
}

/// Checks the Ack and pulls out the full-size URL.
pub fn parse_upload_response(xml: &str) -> Result<String> {
    let ack = ACK_RE
        .captures(xml)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default();

    if ack == "Failure" || ack == "PartialFailure" {
        let message = LONG_MESSAGE_RE
            .captures(xml)
            .map(|c| unescape_xml(c[1].trim()))
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ListerError::EpsUpload(message));
    }

    match FULL_URL_RE.captures(xml) {
        Some(c) if !c[1].trim().is_empty() => Ok(unescape_xml(c[1].trim())),
        _ => Err(ListerError::EpsUpload(
            "no image URL returned from eBay Picture Service".into(),
        )),
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<tag attr="a&b">'x'</tag>"#),
            "&lt;tag attr=&quot;a&amp;b&quot;&gt;&apos;x&apos;&lt;/tag&gt;"
        );
    }

    #[test]
    fn test_escape_ampersand_first() {
        // Must not double-escape the entities it just produced
        assert_eq!(escape_xml("<"), "&lt;");
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_parse_success_response() {
        let xml = r#"<UploadSiteHostedPicturesResponse>
            <Ack>Success</Ack>
            <SiteHostedPictureDetails>
                <FullURL>https://i.ebayimg.com/00/s/abc.jpg</FullURL>
            </SiteHostedPictureDetails>
        </UploadSiteHostedPicturesResponse>"#;

        let url = parse_upload_response(xml).unwrap();
        assert_eq!(url, "https://i.ebayimg.com/00/s/abc.jpg");
    }

    #[test]
    fn test_parse_failure_response_carries_message() {
        let xml = r#"<UploadSiteHostedPicturesResponse>
            <Ack>Failure</Ack>
            <Errors><LongMessage>Picture data is invalid.</LongMessage></Errors>
        </UploadSiteHostedPicturesResponse>"#;

        let err = parse_upload_response(xml).unwrap_err();
        assert!(matches!(err, ListerError::EpsUpload(_)));
        assert!(err.to_string().contains("Picture data is invalid."));
    }

    #[test]
    fn test_parse_response_without_url() {
        let xml = "<UploadSiteHostedPicturesResponse><Ack>Success</Ack></UploadSiteHostedPicturesResponse>";
        let err = parse_upload_response(xml).unwrap_err();
        assert!(matches!(err, ListerError::EpsUpload(_)));
    }

    #[test]
    fn test_parse_url_with_entities() {
        let xml = "<Ack>Success</Ack><FullURL>https://e.com/a?b=1&amp;c=2</FullURL>";
        let url = parse_upload_response(xml).unwrap();
        assert_eq!(url, "https://e.com/a?b=1&c=2");
    }

    #[test]
    fn test_build_request_escapes_fields() {
        let xml = build_upload_request("tok<1>", "QUJD", "a&b.jpg");
        assert!(xml.contains("<eBayAuthToken>tok&lt;1&gt;</eBayAuthToken>"));
        assert!(xml.contains("<PictureName>a&amp;b.jpg</PictureName>"));
        assert!(xml.contains("<PictureData>QUJD</PictureData>"));
    }
}
