//! Teacher PIN gate.
//!
//! A static shared PIN compared in plain equality. This is a convenience
//! screen against casual access by aides, not authentication: there is no
//! lockout, attempt counting or secret storage.

pub const TEACHER_PIN: &str = "1234";

pub fn authenticate(input: &str) -> bool {
    input == TEACHER_PIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        assert!(authenticate("1234"));
        assert!(!authenticate("1234 "));
        assert!(!authenticate(""));
        assert!(!authenticate("4321"));
    }
}
