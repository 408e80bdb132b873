use crate::DomainError;
use std::fmt;
use std::str::FromStr;

/// ストアのルート（レジストリハイブ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreRoot {
    /// HKEY_CURRENT_USER
    CurrentUser,
    /// HKEY_LOCAL_MACHINE
    LocalMachine,
}

impl fmt::Display for StoreRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreRoot::CurrentUser => f.write_str("HKCU"),
            StoreRoot::LocalMachine => f.write_str("HKLM"),
        }
    }
}

/// トグルの適用範囲。System は管理者権限が必要。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    User,
    System,
}

impl Scope {
    pub fn all() -> &'static [Scope] {
        &[Scope::User, Scope::System]
    }

    pub fn root(self) -> StoreRoot {
        match self {
            Scope::User => StoreRoot::CurrentUser,
            Scope::System => StoreRoot::LocalMachine,
        }
    }

    pub fn from_root(root: StoreRoot) -> Scope {
        match root {
            StoreRoot::CurrentUser => Scope::User,
            StoreRoot::LocalMachine => Scope::System,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::System => "system",
        }
    }

    /// user/system フラグから対象スコープを列挙
    pub fn selected(user: bool, system: bool) -> Vec<Scope> {
        let mut scopes = Vec::with_capacity(2);
        if user {
            scopes.push(Scope::User);
        }
        if system {
            scopes.push(Scope::System);
        }
        scopes
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Scope::User => 0,
            Scope::System => 1,
        }
    }
}

impl FromStr for Scope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "hkcu" => Ok(Scope::User),
            "system" | "machine" | "hklm" => Ok(Scope::System),
            other => Err(DomainError::InvalidArgument(format!(
                "unknown scope: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_mapping_is_bijective() {
        for scope in Scope::all() {
            assert_eq!(Scope::from_root(scope.root()), *scope);
        }
        assert_ne!(Scope::User.root(), Scope::System.root());
    }

    #[test]
    fn parse_accepts_hive_aliases() {
        assert_eq!("HKCU".parse::<Scope>().unwrap(), Scope::User);
        assert_eq!("machine".parse::<Scope>().unwrap(), Scope::System);
        assert!("global".parse::<Scope>().is_err());
    }

    #[test]
    fn selected_keeps_user_before_system() {
        assert_eq!(Scope::selected(true, true), vec![Scope::User, Scope::System]);
        assert_eq!(Scope::selected(false, true), vec![Scope::System]);
        assert!(Scope::selected(false, false).is_empty());
    }
}
