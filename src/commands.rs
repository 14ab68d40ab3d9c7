/// `:` commands and their autocomplete

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
  Residents,
  Dashboard,
  Refresh,
  Logout,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub id: CommandId,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    id: CommandId::Residents,
    name: "residents",
    aliases: &["r", "admin"],
    description: "Manage resident records (admins)",
  },
  Command {
    id: CommandId::Dashboard,
    name: "dashboard",
    aliases: &["d", "home"],
    description: "User dashboard",
  },
  Command {
    id: CommandId::Refresh,
    name: "refresh",
    aliases: &["reload"],
    description: "Re-fetch the current page",
  },
  Command {
    id: CommandId::Logout,
    name: "logout",
    aliases: &["signout"],
    description: "Sign out and clear cached data",
  },
  Command {
    id: CommandId::Quit,
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit brgy",
  },
];

/// Resolve typed input to a command: exact name or alias first, else the best suggestion
pub fn resolve(input: &str) -> Option<&'static Command> {
  let input = input.trim();
  if input.is_empty() {
    return None;
  }
  get_suggestions(input).into_iter().next()
}

/// Get autocomplete suggestions for a given input, best match first
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_priority(cmd, &input_lower).map(|p| (cmd, p)))
    .collect();

  // Stable sort keeps declaration order within a priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

fn match_priority(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
    assert!(resolve("  ").is_none());
  }

  #[test]
  fn test_exact_and_alias_match() {
    assert_eq!(get_suggestions("logout")[0].id, CommandId::Logout);
    assert_eq!(get_suggestions("q")[0].id, CommandId::Quit);
    assert_eq!(resolve("home").map(|c| c.id), Some(CommandId::Dashboard));
  }

  #[test]
  fn test_prefix_beats_substring() {
    // "re" prefixes residents and refresh; both outrank substring hits
    let names: Vec<_> = get_suggestions("re").iter().map(|c| c.name).collect();
    assert_eq!(&names[..2], &["residents", "refresh"]);
  }

  #[test]
  fn test_fuzzy_match() {
    assert_eq!(resolve("gout").map(|c| c.id), Some(CommandId::Logout));
    assert!(resolve("boards").is_none());
  }
}
