//! Command Dispatch
//!
//! Parses one line of user input, validates it, executes it against the
//! selected backend and renders the reply. Validation happens here: a record
//! with a non-numeric `birthday` or `coins` never reaches the store, and
//! `-` is only accepted where a wildcard is meaningful (UPDATE and FIND).

use crate::storage::{Record, Store, WILDCARD};
use std::fmt::Write as _;
use std::path::Path;

/// Result of dispatching one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show the user; may be empty or span several lines.
    Reply(String),
    /// The user asked to leave the REPL.
    Quit,
}

/// Executes REPL commands against a backend.
///
/// Commands are case-insensitive. See the crate documentation for the
/// command set.
pub struct CommandHandler {
    store: Box<dyn Store>,
}

impl CommandHandler {
    pub fn new(store: Box<dyn Store>) -> Self {
        Self { store }
    }

    /// Parses and executes one line of input.
    pub fn dispatch(&self, line: &str) -> Outcome {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(command) = tokens.first() else {
            return Outcome::Reply(String::new());
        };

        match command.to_ascii_uppercase().as_str() {
            "Q" | "QUIT" => Outcome::Quit,
            "SET" => Outcome::Reply(self.set(&tokens)),
            "GET" => Outcome::Reply(self.get(&tokens)),
            "EXISTS" => Outcome::Reply(self.exists(&tokens)),
            "DEL" => Outcome::Reply(self.del(&tokens)),
            "UPDATE" => Outcome::Reply(self.update(&tokens)),
            "KEYS" => Outcome::Reply(self.keys()),
            "RENAME" => Outcome::Reply(self.rename(&tokens)),
            "TTL" => Outcome::Reply(self.ttl(&tokens)),
            "FIND" => Outcome::Reply(self.find(&tokens)),
            "SHOWALL" => Outcome::Reply(self.show_all()),
            "UPLOAD" => Outcome::Reply(self.upload(&tokens)),
            "EXPORT" => Outcome::Reply(self.export(&tokens)),
            _ => Outcome::Reply("ERROR: unknown command".to_owned()),
        }
    }

    /// `SET key last first birthday city coins [EX seconds]`
    fn set(&self, tokens: &[&str]) -> String {
        if tokens.len() != 7 && tokens.len() != 9 {
            return invalid_input();
        }

        let value = Record::new(tokens[2], tokens[3], tokens[4], tokens[5], tokens[6]);
        if !is_number(&value.birthday) || !is_number(&value.coins) {
            return invalid_input();
        }

        let lifetime = if tokens.len() == 9 {
            if !tokens[7].eq_ignore_ascii_case("EX") || !is_number(tokens[8]) {
                return invalid_input();
            }
            match tokens[8].parse() {
                Ok(secs) => Some(secs),
                Err(_) => return invalid_input(),
            }
        } else {
            None
        };

        if self.store.set(tokens[1], value, lifetime) {
            "OK".to_owned()
        } else {
            "ERROR: key exists".to_owned()
        }
    }

    /// `GET key`
    fn get(&self, tokens: &[&str]) -> String {
        if tokens.len() != 2 {
            return invalid_input();
        }

        let value = self.store.get(tokens[1]);
        if value.birthday.is_empty() {
            "(null)".to_owned()
        } else {
            format!(
                "{} {} {} {} {}",
                value.last_name, value.first_name, value.birthday, value.city, value.coins
            )
        }
    }

    /// `EXISTS key`
    fn exists(&self, tokens: &[&str]) -> String {
        if tokens.len() != 2 {
            return invalid_input();
        }
        self.store.exists(tokens[1]).to_string()
    }

    /// `DEL key`
    fn del(&self, tokens: &[&str]) -> String {
        if tokens.len() != 2 {
            return invalid_input();
        }
        self.store.delete(tokens[1]).to_string()
    }

    /// `UPDATE key last first birthday city coins`, `-` leaves a field as is
    fn update(&self, tokens: &[&str]) -> String {
        if tokens.len() != 7 {
            return invalid_input();
        }

        let patch = Record::new(tokens[2], tokens[3], tokens[4], tokens[5], tokens[6]);
        if !is_number_or_wildcard(&patch.birthday) || !is_number_or_wildcard(&patch.coins) {
            return invalid_input();
        }

        if self.store.update(tokens[1], &patch) {
            "OK".to_owned()
        } else {
            // A failed update replies with nothing.
            String::new()
        }
    }

    /// `KEYS`
    fn keys(&self) -> String {
        let keys = self.store.keys();
        if keys.is_empty() {
            return "Empty".to_owned();
        }
        numbered(keys.iter().map(String::as_str))
    }

    /// `RENAME from to`
    fn rename(&self, tokens: &[&str]) -> String {
        if tokens.len() != 3 {
            return invalid_input();
        }

        if self.store.rename(tokens[1], tokens[2]) {
            "OK".to_owned()
        } else {
            // A failed rename replies with nothing.
            String::new()
        }
    }

    /// `TTL key`
    fn ttl(&self, tokens: &[&str]) -> String {
        if tokens.len() != 2 {
            return invalid_input();
        }

        if !self.store.exists(tokens[1]) {
            return "(null)".to_owned();
        }
        match self.store.ttl(tokens[1]) {
            Some(secs) => secs.to_string(),
            None => "unlimited".to_owned(),
        }
    }

    /// `FIND last first birthday city coins`, `-` matches any field
    fn find(&self, tokens: &[&str]) -> String {
        if tokens.len() != 6 {
            return invalid_input();
        }

        let query = Record::new(tokens[1], tokens[2], tokens[3], tokens[4], tokens[5]);
        let keys = self.store.find(&query);
        // No matches reply with nothing; only KEYS special-cases "Empty".
        numbered(keys.iter().map(String::as_str))
    }

    /// `SHOWALL`
    fn show_all(&self) -> String {
        let mut out = "# | Last name | First name | Year | City | Coins |".to_owned();
        for (i, record) in self.store.show_all().iter().enumerate() {
            let _ = write!(out, "\n{}) {record}", i + 1);
        }
        out
    }

    /// `UPLOAD path`
    fn upload(&self, tokens: &[&str]) -> String {
        if tokens.len() != 2 {
            return invalid_input();
        }
        format!("OK {}", self.store.upload(Path::new(tokens[1])))
    }

    /// `EXPORT path`
    fn export(&self, tokens: &[&str]) -> String {
        if tokens.len() != 2 {
            return invalid_input();
        }
        format!("OK {}", self.store.export(Path::new(tokens[1])))
    }
}

fn invalid_input() -> String {
    "ERROR: invalid input".to_owned()
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_number_or_wildcard(token: &str) -> bool {
    token == WILDCARD || is_number(token)
}

fn numbered<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, line) in lines.enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}) {line}", i + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RbTree;

    fn handler() -> CommandHandler {
        CommandHandler::new(Box::new(RbTree::new()))
    }

    fn reply(handler: &CommandHandler, line: &str) -> String {
        match handler.dispatch(line) {
            Outcome::Reply(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn set_then_get() {
        let handler = handler();

        assert_eq!(reply(&handler, "SET foo Last First 2001 City 10"), "OK");
        assert_eq!(reply(&handler, "GET foo"), "Last First 2001 City 10");
        assert_eq!(reply(&handler, "GET missing"), "(null)");
    }

    #[tokio::test]
    async fn set_duplicate_reports_key_exists() {
        let handler = handler();

        reply(&handler, "SET foo Last First 2001 City 10");
        assert_eq!(
            reply(&handler, "SET foo Other Name 2002 Town 20"),
            "ERROR: key exists"
        );
    }

    #[tokio::test]
    async fn set_validates_digit_fields() {
        let handler = handler();

        assert_eq!(
            reply(&handler, "SET foo Last First year City 10"),
            "ERROR: invalid input"
        );
        assert_eq!(
            reply(&handler, "SET foo Last First 2001 City coins"),
            "ERROR: invalid input"
        );
        assert_eq!(reply(&handler, "SET foo Last First"), "ERROR: invalid input");
    }

    #[tokio::test]
    async fn set_with_lifetime_registers_ttl() {
        let handler = handler();

        assert_eq!(reply(&handler, "SET foo Last First 2001 City 10 EX 100"), "OK");
        let ttl: u64 = reply(&handler, "TTL foo").parse().unwrap();
        assert!((99..=100).contains(&ttl));

        assert_eq!(
            reply(&handler, "SET bar Last First 2001 City 10 EX soon"),
            "ERROR: invalid input"
        );
    }

    #[tokio::test]
    async fn ttl_distinguishes_unlimited_and_missing() {
        let handler = handler();

        reply(&handler, "SET foo Last First 2001 City 10");
        assert_eq!(reply(&handler, "TTL foo"), "unlimited");
        assert_eq!(reply(&handler, "TTL missing"), "(null)");
    }

    #[tokio::test]
    async fn exists_and_del() {
        let handler = handler();

        reply(&handler, "SET foo Last First 2001 City 10");
        assert_eq!(reply(&handler, "EXISTS foo"), "true");
        assert_eq!(reply(&handler, "DEL foo"), "true");
        assert_eq!(reply(&handler, "EXISTS foo"), "false");
        assert_eq!(reply(&handler, "DEL foo"), "false");
    }

    #[tokio::test]
    async fn update_accepts_wildcards() {
        let handler = handler();

        reply(&handler, "SET foo Last First 2001 City 10");
        assert_eq!(reply(&handler, "UPDATE foo - Renamed - - -"), "OK");
        assert_eq!(reply(&handler, "GET foo"), "Last Renamed 2001 City 10");

        assert_eq!(
            reply(&handler, "UPDATE foo - - year - -"),
            "ERROR: invalid input"
        );
        // Updating a missing key replies with nothing.
        assert_eq!(reply(&handler, "UPDATE missing - - - - -"), "");
    }

    #[tokio::test]
    async fn keys_are_numbered() {
        let handler = handler();

        assert_eq!(reply(&handler, "KEYS"), "Empty");
        reply(&handler, "SET a Last First 2001 City 10");
        reply(&handler, "SET b Last First 2001 City 10");
        assert_eq!(reply(&handler, "KEYS"), "1) a\n2) b");
    }

    #[tokio::test]
    async fn rename_reports_status() {
        let handler = handler();

        reply(&handler, "SET foo Last First 2001 City 10");
        assert_eq!(reply(&handler, "RENAME foo bar"), "OK");
        assert_eq!(reply(&handler, "EXISTS bar"), "true");
        // A failed rename replies with nothing.
        assert_eq!(reply(&handler, "RENAME foo baz"), "");
    }

    #[tokio::test]
    async fn find_lists_matching_keys() {
        let handler = handler();

        reply(&handler, "SET a Alpha First 2001 City 10");
        reply(&handler, "SET b Beta First 2002 City 20");
        reply(&handler, "SET c Gamma Other 2003 City 30");

        assert_eq!(reply(&handler, "FIND - First - - -"), "1) a\n2) b");
        // No matches reply with nothing.
        assert_eq!(reply(&handler, "FIND - Nobody - - -"), "");
    }

    #[tokio::test]
    async fn showall_renders_records() {
        let handler = handler();

        reply(&handler, "SET a Last First 2001 City 10");
        assert_eq!(
            reply(&handler, "SHOWALL"),
            "# | Last name | First name | Year | City | Coins |\n1) \"Last\" \"First\" 2001 \"City\" 10"
        );
    }

    #[tokio::test]
    async fn commands_are_case_insensitive() {
        let handler = handler();

        assert_eq!(reply(&handler, "set foo Last First 2001 City 10"), "OK");
        assert_eq!(reply(&handler, "gEt foo"), "Last First 2001 City 10");
    }

    #[tokio::test]
    async fn quit_in_both_spellings() {
        let handler = handler();

        assert_eq!(handler.dispatch("q"), Outcome::Quit);
        assert_eq!(handler.dispatch("QUIT"), Outcome::Quit);
    }

    #[tokio::test]
    async fn blank_and_unknown_input() {
        let handler = handler();

        assert_eq!(handler.dispatch("   "), Outcome::Reply(String::new()));
        assert_eq!(
            handler.dispatch("FROB foo"),
            Outcome::Reply("ERROR: unknown command".to_owned())
        );
    }
}
