use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Message types are short lowercase tags
    /// - Valid: "direct", "club_invite", "event_reminder"
    /// - Invalid: "Direct", "club-invite", "", "a very long tag ..."
    pub static ref MESSAGE_TYPE_REGEX: Regex = Regex::new(r"^[a-z_]{1,32}$").unwrap();

    /// Names of server-side procedures that may be invoked through RPC
    /// - Valid: "get_clubs_gallery", "get_leaderboard"
    /// - Invalid: "drop table", "public.fn", "1fn", "fn;--"
    pub static ref RPC_NAME_REGEX: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();
}
