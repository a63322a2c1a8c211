//! Who is using the till.

/// Positions accepted on the command line.
pub const VALID_POSITIONS: &str = "Salesperson or Manager";

/// Result of classifying a position given on the command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// Views and exports the aggregate table.
    Manager,
    /// Sells beverages and additions.
    Salesperson,
    /// Anything else, with the reason it was refused.
    Invalid(String),
}

impl Role {
    /// Classifies a position, ignoring case and surrounding whitespace.
    pub fn classify(position: &str) -> Self {
        match position.trim().to_lowercase().as_str() {
            "manager" => Role::Manager,
            "salesperson" => Role::Salesperson,
            _ => Role::Invalid(format!(
                "'{}' is not a valid position. Available positions: {}",
                position, VALID_POSITIONS
            )),
        }
    }
}

/// Full display name used as the key for sales logs, table rows and
/// exports: the first name followed by itself reversed and capitalized,
/// e.g. `Jake` becomes `Jake Ekaj`.
pub fn full_display_name(first_name: &str) -> String {
    let reversed: String = first_name.chars().rev().collect::<String>().to_lowercase();
    let mut chars = reversed.chars();
    let surname: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{} {}", first_name, surname)
}

#[cfg(test)]
mod test {
    use crate::role::{full_display_name, Role};

    #[test]
    fn test_classify() {
        assert_eq!(Role::Manager, Role::classify("Manager"));
        assert_eq!(Role::Manager, Role::classify("MANAGER"));
        assert_eq!(Role::Salesperson, Role::classify(" salesperson "));
        assert!(matches!(
            Role::classify("barista"),
            Role::Invalid(reason) if reason.contains("'barista'")
        ));
        assert!(matches!(Role::classify(""), Role::Invalid(_)));
    }

    #[test]
    fn test_full_display_name() {
        assert_eq!("Jake Ekaj", full_display_name("Jake"));
        assert_eq!("Jim Mij", full_display_name("Jim"));
        assert_eq!("ANNA Anna", full_display_name("ANNA"));
        assert_eq!(" ", full_display_name(""));
    }
}
