use crate::DomainError;
use std::fmt;
use std::str::FromStr;

/// ゾーンの整数コード。ストアのパス組み立てに使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneCode(u32);

impl ZoneCode {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 保護モードが適用されるセキュリティゾーン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Zone {
    Intranet,
    Trusted,
    Internet,
    Restricted,
}

impl Zone {
    /// 全ゾーン（コード順）
    pub fn all() -> &'static [Zone] {
        &[Zone::Intranet, Zone::Trusted, Zone::Internet, Zone::Restricted]
    }

    pub fn code(self) -> ZoneCode {
        ZoneCode(match self {
            Zone::Intranet => 1,
            Zone::Trusted => 2,
            Zone::Internet => 3,
            Zone::Restricted => 4,
        })
    }

    /// 未知のコードは None
    pub fn from_code(code: u32) -> Option<Zone> {
        match code {
            1 => Some(Zone::Intranet),
            2 => Some(Zone::Trusted),
            3 => Some(Zone::Internet),
            4 => Some(Zone::Restricted),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Zone::Intranet => "intranet",
            Zone::Trusted => "trusted",
            Zone::Internet => "internet",
            Zone::Restricted => "restricted",
        }
    }

    /// 「危険」側のゾーン（インターネット、制限付きサイト）
    pub fn is_risky(self) -> bool {
        matches!(self, Zone::Internet | Zone::Restricted)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Zone::Intranet => 0,
            Zone::Trusted => 1,
            Zone::Internet => 2,
            Zone::Restricted => 3,
        }
    }
}

impl TryFrom<u32> for Zone {
    type Error = DomainError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Zone::from_code(code)
            .ok_or_else(|| DomainError::InvalidArgument(format!("unknown zone code: {code}")))
    }
}

impl FromStr for Zone {
    type Err = DomainError;

    /// ゾーン名（大文字小文字を区別しない）または数値コードを受け付ける。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u32>() {
            return Zone::try_from(code);
        }
        Zone::all()
            .iter()
            .copied()
            .find(|z| z.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::InvalidArgument(format!("unknown zone: '{trimmed}'")))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
