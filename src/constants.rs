pub const API_ROOT: &str = "api";
pub const API_APP: &str = "recipe";

pub const AUTH_HEADER_KEYWORD: &str = "Token";

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_LINK_LENGTH: usize = 255;

/* NUMERIC(5, 2) */
pub const PRICE_DECIMAL_PLACES: u32 = 2;
pub const PRICE_WHOLE_DIGITS: u32 = 3;
