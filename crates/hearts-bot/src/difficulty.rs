/// Iteration presets exposed to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl BotDifficulty {
    pub const ALL: [BotDifficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn iterations(self) -> u32 {
        match self {
            Self::Easy => 500,
            Self::Medium => 1500,
            Self::Hard => 2000,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" | "normal" | "default" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        read("MDH_BOT_DIFFICULTY")
            .and_then(|raw| Self::from_name(&raw))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::BotDifficulty;

    #[test]
    fn presets_grow_with_difficulty() {
        let budgets: Vec<u32> = BotDifficulty::ALL.iter().map(|d| d.iterations()).collect();
        assert_eq!(budgets, vec![500, 1500, 2000]);
    }

    #[test]
    fn names_parse_loosely() {
        assert_eq!(BotDifficulty::from_name(" HARD "), Some(BotDifficulty::Hard));
        assert_eq!(BotDifficulty::from_name("normal"), Some(BotDifficulty::Medium));
        assert_eq!(BotDifficulty::from_name("legendary"), None);
        for difficulty in BotDifficulty::ALL {
            assert_eq!(BotDifficulty::from_name(difficulty.label()), Some(difficulty));
        }
    }

    #[test]
    fn unknown_env_value_falls_back_to_default() {
        let read = |key: &str| (key == "MDH_BOT_DIFFICULTY").then(|| "impossible".to_string());
        assert_eq!(BotDifficulty::from_reader(read), BotDifficulty::Medium);
        assert_eq!(BotDifficulty::from_reader(|_| None), BotDifficulty::Medium);
    }
}
