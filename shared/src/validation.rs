use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

static VIDEO_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

pub fn validate_campaign_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.len() < 3 || trimmed.len() > 80 {
        return Err(ValidationError::new("invalid_campaign_title"));
    }
    Ok(())
}

pub fn validate_video_url(url: &str) -> Result<(), ValidationError> {
    if url.len() > 2048 || !VIDEO_URL_RE.is_match(url) {
        return Err(ValidationError::new("invalid_video_url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_bounds() {
        assert!(validate_campaign_title("Launch week").is_ok());
        assert!(validate_campaign_title("ab").is_err());
        assert!(validate_campaign_title(&"x".repeat(81)).is_err());
    }

    #[test]
    fn test_video_url() {
        assert!(validate_video_url("https://videos.example.com/clip/42").is_ok());
        assert!(validate_video_url("http://cdn.example.com/a.mp4").is_ok());
        assert!(validate_video_url("ftp://example.com/a.mp4").is_err());
        assert!(validate_video_url("not a url").is_err());
    }
}
