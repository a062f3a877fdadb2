use chili::{Action, IllegalMove};

/// Error type for one action of a bot.
#[derive(Debug)]
pub struct IllegalAction {
    /// Counts the actions within the turn, starting at 0. Anything above 0
    /// continues a capture chain.
    pub action_idx: usize,
    pub action: Action,
    pub err: IllegalMove,
}

impl std::error::Error for IllegalAction {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

impl std::fmt::Display for IllegalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.action {
            Action::Move(mv) => write!(
                f,
                "Action {} of the turn, moving from {:?} to {:?}, was rejected",
                self.action_idx + 1,
                mv.from,
                mv.to
            ),
            Action::EndTurn => write!(
                f,
                "Action {} of the turn, ending the turn, was rejected",
                self.action_idx + 1
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chili::MoveRecord;

    use super::*;

    #[test]
    fn reports_the_cause() {
        let err = IllegalAction {
            action_idx: 1,
            action: Action::Move(MoveRecord {
                from: [2, 0],
                to: [2, 1],
            }),
            err: IllegalMove::NoChainToEnd,
        };
        assert_eq!(
            err.to_string(),
            "Action 2 of the turn, moving from [2, 0] to [2, 1], was rejected"
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), IllegalMove::NoChainToEnd.to_string());
    }
}
