use serde::Serialize;
use waypoint_core::ShortLinkRecord;
use waypoint_shortener::CreatedLink;

#[derive(Serialize)]
pub struct CreateLinkResponse {
    pub short_url: String,
    pub url: String,
    pub token: String,
}

impl From<CreatedLink> for CreateLinkResponse {
    fn from(link: CreatedLink) -> Self {
        Self {
            short_url: link.short_url,
            url: link.url,
            token: link.token.into(),
        }
    }
}

#[derive(Serialize)]
pub struct DeleteLinkResponse {}

#[derive(Serialize)]
pub struct LinkResponse {
    pub token: String,
    pub url: String,
}

impl From<ShortLinkRecord> for LinkResponse {
    fn from(record: ShortLinkRecord) -> Self {
        Self {
            token: record.token.into(),
            url: record.destination_url,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
