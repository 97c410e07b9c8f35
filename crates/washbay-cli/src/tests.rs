use super::*;

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["washbay-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn parses_seed_with_default_file() {
    let cli = Cli::try_parse_from(["washbay-cli", "seed"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Seed {
            file: None,
            dry_run: false
        })
    ));
}

#[test]
fn parses_seed_with_explicit_file_and_dry_run() {
    let cli = Cli::try_parse_from([
        "washbay-cli",
        "seed",
        "--file",
        "config/stores.yaml",
        "--dry-run",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Seed {
            file: Some(ref f),
            dry_run: true
        }) if f == &PathBuf::from("config/stores.yaml")
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["washbay-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn nearby_accepts_negative_longitude_and_defaults() {
    let cli = Cli::try_parse_from([
        "washbay-cli",
        "nearby",
        "--latitude",
        "40.7128",
        "--longitude",
        "-74.0060",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Nearby(args)) = cli.command else {
        panic!("expected nearby command");
    };
    assert!((args.longitude + 74.006).abs() < 1e-9);
    assert!((args.max_distance_m - 5000.0).abs() < f64::EPSILON);
    assert_eq!(args.limit, 20);
    assert!(!args.open_now);
    assert!(args.services.is_empty());
}

#[test]
fn nearby_collects_repeated_services() {
    let cli = Cli::try_parse_from([
        "washbay-cli",
        "nearby",
        "--latitude",
        "40.7",
        "--longitude",
        "-74.0",
        "--service",
        "wax",
        "--service",
        "interior",
        "--open-now",
        "--available-only",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Nearby(args)) = cli.command else {
        panic!("expected nearby command");
    };
    assert_eq!(args.services, ["wax", "interior"]);
    assert!(args.open_now);
    assert!(args.available_only);
}

#[test]
fn nearby_requires_coordinates() {
    assert!(Cli::try_parse_from(["washbay-cli", "nearby", "--latitude", "40.7"]).is_err());
}
