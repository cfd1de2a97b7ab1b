/// Sent when the latest response carries no homeworks.
pub const NO_NEW_STATUSES: &str = "Нет новых статусов";

/// Prefix of every failure report relayed to the chat.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Returns `None` for anything outside the known set.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Homework {
    pub homework_name: String,
    pub status: HomeworkStatus,
}

impl Homework {
    pub fn status_message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\", {}",
            self.homework_name,
            self.status.verdict()
        )
    }
}

pub fn failure_message(err: &dyn std::fmt::Display) -> String {
    format!("{FAILURE_PREFIX}: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_statuses() {
        for status in HomeworkStatus::ALL {
            assert_eq!(HomeworkStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(HomeworkStatus::parse("Approved"), None);
        assert_eq!(HomeworkStatus::parse(""), None);
    }

    #[test]
    fn status_message_embeds_name_and_verdict() {
        let hw = Homework {
            homework_name: "hw1".into(),
            status: HomeworkStatus::Rejected,
        };
        assert_eq!(
            hw.status_message(),
            "Изменился статус проверки работы \"hw1\", Работа проверена: у ревьюера есть замечания."
        );
    }

    #[test]
    fn failure_message_has_prefix() {
        assert_eq!(failure_message(&"boom"), "Сбой в работе программы: boom");
    }
}
