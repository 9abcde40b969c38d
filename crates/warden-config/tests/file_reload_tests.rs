// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End to end: config file -> policy file -> store -> reload.

use std::fs;

use warden_authz::{Action, Resource, Subject};
use warden_config::{load_config_with_file, open_store, FilePolicySource, PolicyFormat};

fn warden_env_set() -> bool {
	std::env::vars().any(|(name, _)| name.starts_with("WARDEN_POLICY_"))
}

#[test]
fn config_file_points_at_policy_file() {
	if warden_env_set() {
		return;
	}
	let dir = tempfile::tempdir().unwrap();
	let policy_path = dir.path().join("policy.csv");
	fs::write(
		&policy_path,
		"p, role:user, resource:order, action:write\ng, user:alice, role:user\n",
	)
	.unwrap();
	let config_path = dir.path().join("warden.toml");
	fs::write(
		&config_path,
		format!("[policy]\npath = {:?}\n", policy_path.display().to_string()),
	)
	.unwrap();

	let config = load_config_with_file(&config_path).unwrap();
	assert_eq!(config.policy.path, policy_path);
	assert_eq!(config.policy.format, PolicyFormat::Lines);

	let store = open_store(&config.policy).unwrap();
	let alice = Subject::user("alice").unwrap();
	assert!(store.enforce(
		&alice,
		&Resource::new("order").unwrap(),
		&Action::new("write").unwrap()
	));
}

#[test]
fn reload_picks_up_edited_file_and_survives_bad_edit() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("policy.toml");
	fs::write(
		&path,
		r#"
[[rules]]
principal = "role:user"
resource = "resource:order"
action = "action:write"

[[roles]]
member = "user:alice"
role = "role:user"
"#,
	)
	.unwrap();

	let source = FilePolicySource::new(&path, PolicyFormat::Toml);
	let store = warden_authz::PolicyStore::from_source(&source).unwrap();
	let alice = Subject::user("alice").unwrap();
	let order = Resource::new("order").unwrap();
	let write = Action::new("write").unwrap();
	let read = Action::new("read").unwrap();
	assert!(store.enforce(&alice, &order, &write));

	fs::write(
		&path,
		r#"
[[rules]]
principal = "user:alice"
resource = "resource:order"
action = "action:read"
"#,
	)
	.unwrap();
	assert_eq!(store.reload(&source).unwrap(), 2);
	assert!(!store.enforce(&alice, &order, &write));
	assert!(store.enforce(&alice, &order, &read));

	fs::write(&path, "[[rules]]\nprincipal = \"user:alice\"\n").unwrap();
	assert!(store.reload(&source).is_err());
	assert_eq!(store.generation(), 2);
	assert!(store.enforce(&alice, &order, &read));

	fs::remove_file(&path).unwrap();
	assert!(store.reload(&source).is_err());
	assert!(store.enforce(&alice, &order, &read));
}
