//! Main menu commands

use block_model::BlockKind;

/// One numbered menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Read(BlockKind),
    ReadAll,
    Write(BlockKind),
    CreateUser,
    Exit,
}

impl MenuCommand {
    /// Menu order, numbered from 1
    pub const ALL: [MenuCommand; 9] = [
        MenuCommand::Read(BlockKind::DiscreteInputs),
        MenuCommand::Read(BlockKind::Coils),
        MenuCommand::Read(BlockKind::InputRegisters),
        MenuCommand::Read(BlockKind::HoldingRegisters),
        MenuCommand::ReadAll,
        MenuCommand::Write(BlockKind::Coils),
        MenuCommand::Write(BlockKind::HoldingRegisters),
        MenuCommand::CreateUser,
        MenuCommand::Exit,
    ];

    /// Parse the operator's selection, `"1"` to `"9"`
    pub fn parse(input: &str) -> Option<Self> {
        let number: usize = input.trim().parse().ok()?;
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index))
            .copied()
    }

    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .map_or(0, |index| index + 1)
    }

    pub fn title(&self) -> &'static str {
        match self {
            MenuCommand::Read(BlockKind::DiscreteInputs) => "Discrete Input Contact values",
            MenuCommand::Read(BlockKind::Coils) => "Discrete Output Coil values",
            MenuCommand::Read(BlockKind::InputRegisters) => "Analogue Input Register values",
            MenuCommand::Read(BlockKind::HoldingRegisters) => {
                "Analogue Output Holding Register values"
            },
            MenuCommand::ReadAll => "Display all Discrete and Register values",
            MenuCommand::Write(BlockKind::HoldingRegisters) => {
                "Write to the Analogue Output Holding Register"
            },
            MenuCommand::Write(_) => "Write values to the Discrete Output Coils",
            MenuCommand::CreateUser => "Create/update a username and password",
            MenuCommand::Exit => "Exit/Quit",
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            MenuCommand::parse("1"),
            Some(MenuCommand::Read(BlockKind::DiscreteInputs))
        );
        assert_eq!(
            MenuCommand::parse(" 7 "),
            Some(MenuCommand::Write(BlockKind::HoldingRegisters))
        );
        assert_eq!(MenuCommand::parse("9"), Some(MenuCommand::Exit));
    }

    #[test]
    fn test_parse_rejects_out_of_menu() {
        for input in ["0", "10", "", "a", "-1", "1.0"] {
            assert_eq!(MenuCommand::parse(input), None, "input {:?}", input);
        }
    }

    #[test]
    fn test_numbers_follow_menu_order() {
        for (index, command) in MenuCommand::ALL.iter().enumerate() {
            assert_eq!(command.number(), index + 1);
            assert_eq!(MenuCommand::parse(&command.number().to_string()), Some(*command));
        }
        assert_eq!(MenuCommand::ReadAll.title(), "Display all Discrete and Register values");
    }
}
