use super::*;

#[test]
fn parses_refresh_command() {
    let cli =
        Cli::try_parse_from(["pickupboard-cli", "refresh"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Refresh { dry_run: false })
    ));
}

#[test]
fn parses_refresh_dry_run() {
    let cli = Cli::try_parse_from(["pickupboard-cli", "refresh", "--dry-run"])
        .expect("expected valid cli args");

    assert!(matches!(cli.command, Some(Commands::Refresh { dry_run: true })));
}

#[test]
fn parses_snapshot_command() {
    let cli = Cli::try_parse_from(["pickupboard-cli", "snapshot", "--pretty"])
        .expect("expected valid cli args");

    assert!(matches!(cli.command, Some(Commands::Snapshot { pretty: true })));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["pickupboard-cli", "db", "migrate"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["pickupboard-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pickupboard-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["pickupboard-cli", "collect"]).is_err());
}
