//! Token-type flags. A token can carry more than one at once (a run can
//! be both `FIELD_VALUE` and `WILDCARD_ANY_STRING`), so these are bits
//! rather than an enum discriminant.

pub const OPEN_GROUP: u32 = 1 << 0;
pub const CLOSE_GROUP: u32 = 1 << 1;
pub const OPEN_OPEN_RANGE: u32 = 1 << 2;
pub const CLOSE_OPEN_RANGE: u32 = 1 << 3;
pub const OPEN_CLOSED_RANGE: u32 = 1 << 4;
pub const CLOSE_CLOSED_RANGE: u32 = 1 << 5;
pub const QUOTE: u32 = 1 << 6;
pub const REGEX_DELIMITER: u32 = 1 << 7;
pub const BOOLEAN_AND: u32 = 1 << 8;
pub const BOOLEAN_OR: u32 = 1 << 9;
pub const BOOLEAN_NOT: u32 = 1 << 10;
pub const WILDCARD_ANY_CHAR: u32 = 1 << 11;
pub const WILDCARD_ANY_STRING: u32 = 1 << 12;
pub const MODIFIER_BOOST: u32 = 1 << 13;
pub const MODIFIER_SLOPE: u32 = 1 << 14;
pub const FIELD: u32 = 1 << 15;
pub const COLON: u32 = 1 << 16;
pub const FIELD_VALUE: u32 = 1 << 17;
pub const MODIFIER_VALUE: u32 = 1 << 18;

/// Set on a token's `phrase_flags` (not its `types`) when the token sits
/// between an opening and closing `Quote` token.
pub const PHRASE_MEMBER: u32 = 1 << 0;
