//! Integration tests for the proshop CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a proshop command running as a fixed author
fn proshop() -> Command {
    let mut cmd = Command::cargo_bin("proshop").unwrap();
    cmd.env("PROSHOP_AUTHOR", "mgr")
        .env_remove("PROSHOP_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    proshop().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a quiet `new` command and return the printed id
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = proshop()
        .current_dir(tmp.path())
        .arg("-q")
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn create_customer(tmp: &TempDir, name: &str) -> String {
    create(tmp, &["customer", "new", "--name", name])
}

fn create_fingertip_sheet(tmp: &TempDir, customer: &str) -> String {
    create(
        tmp,
        &[
            "drill", "new",
            "--customer", customer,
            "--name", "Fingertip",
            "--grip", "fingertip",
            "--thumb-middle", "4.40",
            "--bridge", "0.25",
            "--thumb-size", "31/64",
            "--middle-size", "31/64",
            "--ring-size", "31/64",
        ],
    )
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    proshop()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("drill"))
        .stdout(predicate::str::contains("customer"));
}

#[test]
fn test_unknown_command_fails() {
    proshop().arg("frobnicate").assert().failure();
}

#[test]
fn test_init_creates_project_structure() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".proshop/config.yaml").exists());
    for dir in ["customers", "balls", "drill_sheets", "work_orders", "employees", "locations"] {
        assert!(tmp.path().join(dir).is_dir(), "missing {}", dir);
    }
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();
    proshop()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    proshop()
        .current_dir(tmp.path())
        .args(["customer", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("proshop init"));
}

// ============================================================================
// Customer Tests
// ============================================================================

#[test]
fn test_customer_new_and_list() {
    let tmp = setup_test_project();
    let id = create_customer(&tmp, "Pat Rivera");
    assert!(id.starts_with("CUST-"));
    assert!(tmp.path().join(format!("customers/{}.shop.yaml", id)).exists());

    proshop()
        .current_dir(tmp.path())
        .args(["customer", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pat Rivera"))
        .stdout(predicate::str::contains("CUST@1"));
}

#[test]
fn test_customer_show_by_short_id() {
    let tmp = setup_test_project();
    create_customer(&tmp, "Pat Rivera");
    proshop()
        .current_dir(tmp.path())
        .args(["customer", "list"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .args(["customer", "show", "CUST@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pat Rivera"));
}

#[test]
fn test_customer_new_rejects_bad_email() {
    let tmp = setup_test_project();
    proshop()
        .current_dir(tmp.path())
        .args(["customer", "new", "--name", "Pat", "--email", "not-an-email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email"));
}

#[test]
fn test_customer_delete_refused_while_owning_records() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    create_fingertip_sheet(&tmp, &customer);

    proshop()
        .current_dir(tmp.path())
        .args(["customer", "delete", &customer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    proshop()
        .current_dir(tmp.path())
        .args(["customer", "delete", &customer, "--force"])
        .assert()
        .success();
}

// ============================================================================
// Drill Sheet Tests
// ============================================================================

#[test]
fn test_drill_new_fingertip_sheet() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    let sheet = create_fingertip_sheet(&tmp, &customer);
    assert!(sheet.starts_with("DRL-"));

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "show", &sheet, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance\": 0.25"))
        .stdout(predicate::str::contains("\"fit_span\": 4.4"))
        .stdout(predicate::str::contains("\"created\""));
}

#[test]
fn test_drill_new_rejects_narrow_bridge() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");

    proshop()
        .current_dir(tmp.path())
        .args([
            "drill", "new",
            "--customer", &customer,
            "--name", "Too tight",
            "--thumb-middle", "4.40",
            "--bridge", "0.1",
            "--thumb-size", "31/64",
            "--middle-size", "31/64",
            "--ring-size", "31/64",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bridge.distance"));

    let files = fs::read_dir(tmp.path().join("drill_sheets")).unwrap().count();
    assert_eq!(files, 0);
}

#[test]
fn test_drill_new_needs_a_thumb_span() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");

    proshop()
        .current_dir(tmp.path())
        .args([
            "drill", "new",
            "--customer", &customer,
            "--name", "No spans",
            "--thumb-size", "1",
            "--middle-size", "31/64",
            "--ring-size", "31/64",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("spans"));
}

#[test]
fn test_drill_two_handed_needs_no_thumb() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");

    let sheet = create(
        &tmp,
        &[
            "drill", "new",
            "--customer", &customer,
            "--name", "Two hands",
            "--grip", "two_handed_no_thumb",
            "--middle-size", "31/64",
            "--ring-size", "31/64",
        ],
    );

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "show", &sheet, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"thumb\":").not());
}

#[test]
fn test_drill_grip_round_trip_restores_thumb() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    let sheet = create_fingertip_sheet(&tmp, &customer);

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "update", &sheet, "--grip", "two_handed_no_thumb"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "update", &sheet, "--grip", "fingertip", "--thumb-size", "1"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "show", &sheet, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"thumb_enabled\": true"))
        .stdout(predicate::str::contains("\"primary\": \"1\""));
}

#[test]
fn test_drill_update_keeps_other_fields() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    let sheet = create_fingertip_sheet(&tmp, &customer);

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "update", &sheet, "--bridge", "0.375"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "show", &sheet, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance\": 0.375"))
        .stdout(predicate::str::contains("\"fit_span\": 4.4"))
        .stdout(predicate::str::contains("\"grip_style\": \"fingertip\""));
}

#[test]
fn test_drill_update_invalid_leaves_file_untouched() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    let sheet = create_fingertip_sheet(&tmp, &customer);
    let path = tmp.path().join(format!("drill_sheets/{}.shop.yaml", sheet));
    let before = fs::read_to_string(&path).unwrap();

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "update", &sheet, "--bridge", "2.0"])
        .assert()
        .failure();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

fn write_legacy_sheet(tmp: &TempDir) -> std::path::PathBuf {
    let path = tmp
        .path()
        .join("drill_sheets/DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD.shop.yaml");
    fs::write(
        &path,
        r#"id: DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD
name: Old sheet
customer_id: CUST-01HC2JB7SMQX7RS1Y0GFKBHPTE
grip_style: conventional
spans:
  thumb_to_middle:
    fit_span: 4.5
  thumb_to_ring:
    fit_span: 4.75
  middle_to_ring:
    fit_span: 0.3
holes:
  thumb:
    size:
      primary: "1"
  middle:
    size:
      primary: "31/64"
  ring:
    size:
      primary: "31/64"
created: 2023-06-01T09:30:00Z
author: J. Smith
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_drill_migrate_rewrites_legacy_sheet() {
    let tmp = setup_test_project();
    let path = write_legacy_sheet(&tmp);

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "migrate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would migrate"));
    assert!(fs::read_to_string(&path).unwrap().contains("middle_to_ring"));

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "migrate"])
        .assert()
        .success();
    let migrated = fs::read_to_string(&path).unwrap();
    assert!(!migrated.contains("middle_to_ring"));
    assert!(migrated.contains("distance: 0.3"));

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "migrate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 already current"));
}

#[test]
fn test_drill_update_bridge_on_legacy_sheet() {
    let tmp = setup_test_project();
    let path = write_legacy_sheet(&tmp);

    proshop()
        .current_dir(tmp.path())
        .args(["drill", "update", "DRL-01HC2JB7SMQX7RS1Y0GFKBHPTD", "--bridge", "0.5"])
        .assert()
        .success();

    let updated = fs::read_to_string(&path).unwrap();
    assert!(updated.contains("distance: 0.5"));
    assert!(!updated.contains("middle_to_ring"));
}

// ============================================================================
// Validate Tests
// ============================================================================

#[test]
fn test_validate_clean_project_passes() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    create_fingertip_sheet(&tmp, &customer);

    proshop()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed"));
}

#[test]
fn test_validate_warns_on_legacy_sheet() {
    let tmp = setup_test_project();
    write_legacy_sheet(&tmp);

    proshop()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("drill migrate"));

    proshop()
        .current_dir(tmp.path())
        .args(["validate", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_validate_fails_on_bad_files() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join("customers/CUST-01HC2JB7SMQX7RS1Y0GFKBHPTE.shop.yaml"),
        "id: CUST-01HC2JB7SMQX7RS1Y0GFKBHPTE\nname: [unclosed\n",
    )
    .unwrap();

    proshop()
        .current_dir(tmp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn test_validate_reports_form_rule_errors() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    let sheet = create_fingertip_sheet(&tmp, &customer);
    let path = tmp.path().join(format!("drill_sheets/{}.shop.yaml", sheet));
    let content = fs::read_to_string(&path).unwrap().replace("distance: 0.25", "distance: 0.1");
    fs::write(&path, content).unwrap();

    proshop()
        .current_dir(tmp.path())
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("bridge.distance"));
}

// ============================================================================
// Work Order and Report Tests
// ============================================================================

#[test]
fn test_work_order_cost_from_employee_rate() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    let employee = create(
        &tmp,
        &["employee", "new", "--name", "Sam", "--role", "drill-technician", "--rate", "40"],
    );
    let wo = create(
        &tmp,
        &[
            "wo", "new",
            "--description", "Drill new ball",
            "--customer", &customer,
            "--employee", &employee,
            "--hours", "1.5",
            "--materials", "20",
        ],
    );

    proshop()
        .current_dir(tmp.path())
        .args(["wo", "show", &wo, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"labor_cost\": 60.0"))
        .stdout(predicate::str::contains("\"total_cost\": 80.0"));

    proshop()
        .current_dir(tmp.path())
        .args(["wo", "update", &wo, "--hours", "2", "--quality-checked"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .args(["wo", "show", &wo, "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_cost\": 100.0"))
        .stdout(predicate::str::contains("\"quality_checked\": true"));
}

#[test]
fn test_work_order_needs_existing_customer() {
    let tmp = setup_test_project();
    proshop()
        .current_dir(tmp.path())
        .args([
            "wo", "new",
            "--description", "Resurface",
            "--customer", "CUST-01HC2JB7SMQX7RS1Y0GFKBHPTE",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("customer_id"));
}

#[test]
fn test_report_summary_counts_recent_orders() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    for description in ["Drill", "Resurface"] {
        create(
            &tmp,
            &[
                "wo", "new",
                "--description", description,
                "--customer", &customer,
                "--materials", "25",
                "--satisfaction", "4",
            ],
        );
    }

    proshop()
        .current_dir(tmp.path())
        .args(["report", "summary", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distinct_customers\": 1"))
        .stdout(predicate::str::contains("\"work_orders\": 2"))
        .stdout(predicate::str::contains("\"total_cost\": 50.0"));
}

#[test]
fn test_report_summary_rejects_huge_window() {
    let tmp = setup_test_project();

    proshop()
        .current_dir(tmp.path())
        .args(["report", "summary", "--days", "4294967295"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("too far back"));
}

#[test]
fn test_report_grips_groups_by_style() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");
    create_fingertip_sheet(&tmp, &customer);

    proshop()
        .current_dir(tmp.path())
        .args(["report", "grips"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fingertip"))
        .stdout(predicate::str::contains("4.400"));
}

// ============================================================================
// Ball Tests
// ============================================================================

#[test]
fn test_ball_weight_limits() {
    let tmp = setup_test_project();
    let customer = create_customer(&tmp, "Pat Rivera");

    create(
        &tmp,
        &["ball", "new", "-c", &customer, "--brand", "Storm", "--model", "Phaze", "-w", "16"],
    );

    proshop()
        .current_dir(tmp.path())
        .args(["ball", "new", "-c", &customer, "--brand", "Storm", "--model", "Phaze", "-w", "17"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weight"));
}

#[test]
fn test_ball_status_update() {
    let tmp = setup_test_project();
    let ball = create(&tmp, &["ball", "new", "--brand", "Roto Grip", "--model", "Idol", "-w", "15"]);

    proshop()
        .current_dir(tmp.path())
        .args(["ball", "status", &ball, "retired"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .args(["ball", "list", "--status", "retired", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

// ============================================================================
// Team Tests
// ============================================================================

#[test]
fn test_apprentice_cannot_create_customers() {
    let tmp = setup_test_project();
    proshop()
        .current_dir(tmp.path())
        .args(["team", "add", "--name", "Manager", "--username", "mgr", "--roles", "shop-manager"])
        .assert()
        .success();
    proshop()
        .current_dir(tmp.path())
        .args(["team", "add", "--name", "Apprentice", "--username", "app", "--roles", "apprentice"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .env("PROSHOP_AUTHOR", "app")
        .args(["customer", "new", "--name", "Pat Rivera"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("may not"));

    proshop()
        .current_dir(tmp.path())
        .args(["customer", "new", "--name", "Pat Rivera"])
        .assert()
        .success();
}

#[test]
fn test_non_member_is_refused_once_roster_exists() {
    let tmp = setup_test_project();
    proshop()
        .current_dir(tmp.path())
        .args(["team", "add", "--name", "Manager", "--username", "mgr", "--roles", "shop-manager"])
        .assert()
        .success();

    proshop()
        .current_dir(tmp.path())
        .env("PROSHOP_AUTHOR", "stranger")
        .args(["customer", "new", "--name", "Pat Rivera"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an active member"));
}
