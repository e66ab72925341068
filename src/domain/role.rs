// Stakeholder roles - each one selects a dashboard layout
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Ceo,
    Marketing,
    Inventory,
    Sales,
    Customers,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Ceo,
        Role::Marketing,
        Role::Inventory,
        Role::Sales,
        Role::Customers,
    ];

    /// URL-safe identifier, also used as the layout key in `config/roles.toml`
    pub fn slug(&self) -> &'static str {
        match self {
            Role::Ceo => "ceo",
            Role::Marketing => "marketing",
            Role::Inventory => "inventory",
            Role::Sales => "sales",
            Role::Customers => "customers",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Ceo => "CEO",
            Role::Marketing => "Marketing Manager",
            Role::Inventory => "Inventory Manager",
            Role::Sales => "Sales Executive",
            Role::Customers => "Customers",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts either the slug ("sales") or the display name ("Sales Executive")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| {
                r.slug().eq_ignore_ascii_case(wanted)
                    || r.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slug_and_display_name() {
        assert_eq!("ceo".parse::<Role>(), Ok(Role::Ceo));
        assert_eq!("Inventory Manager".parse::<Role>(), Ok(Role::Inventory));
        assert_eq!("  SALES ".parse::<Role>(), Ok(Role::Sales));
    }

    #[test]
    fn test_unknown_role() {
        let err = "payroll".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("payroll".to_string()));
    }
}
