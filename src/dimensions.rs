use crate::error::ApiError;

pub const MIN_DIMENSION: u32 = 1;
pub const MAX_DIMENSION: u32 = 2048;
pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 300;

const RANGE_MESSAGE: &str = "Dimensions must be between 1x1 and 2048x2048";
const FORMAT_MESSAGE: &str = "Invalid dimension format. Use WIDTHxHEIGHT (e.g., 800x600)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self, ApiError> {
        let range = MIN_DIMENSION..=MAX_DIMENSION;
        if !range.contains(&width) || !range.contains(&height) {
            return Err(ApiError::Validation(RANGE_MESSAGE.to_string()));
        }
        Ok(Self { width, height })
    }

    /// Parses optional query values, falling back to 400x300.
    pub fn parse_pair(width: Option<&str>, height: Option<&str>) -> Result<Self, ApiError> {
        let width = parse_component(width, DEFAULT_WIDTH)?;
        let height = parse_component(height, DEFAULT_HEIGHT)?;
        Self::new(width, height)
    }

    /// Parses the `800x600` path form.
    pub fn parse_segment(segment: &str) -> Result<Self, ApiError> {
        let (width, height) = segment
            .split_once('x')
            .filter(|(width, height)| is_digits(width) && is_digits(height))
            .ok_or_else(|| ApiError::Validation(FORMAT_MESSAGE.to_string()))?;
        // digit strings too long for u32 are out of range, not malformed
        let width = width.parse::<u32>().unwrap_or(u32::MAX);
        let height = height.parse::<u32>().unwrap_or(u32::MAX);
        Self::new(width, height)
    }

    pub fn default_text(&self) -> String {
        format!("{}×{} Placeholder", self.width, self.height)
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

fn parse_component(raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(default);
    };
    if !is_digits(raw) {
        return Err(ApiError::Validation(format!(
            "Invalid dimension value: {raw}"
        )));
    }
    Ok(raw.parse::<u32>().unwrap_or(u32::MAX))
}
