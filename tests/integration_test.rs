//! End-to-end use: options from TOML, open, inspect, summarize, edit, save

mod common;

use common::RawFixture;
use std::fs;
use tempfile::TempDir;
use uasset_rs::{AssetKind, Container, ContainerOptions, VersionTag};

fn write_pair(dir: &TempDir, stem: &str, fixture: &RawFixture) -> std::path::PathBuf {
    let (metadata, payload) = fixture.build();
    let path = dir.path().join(format!("{}.uasset", stem));
    fs::write(&path, metadata).unwrap();
    fs::write(path.with_extension("uexp"), payload).unwrap();
    path
}

#[test]
fn test_options_from_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("options.toml");
    fs::write(
        &config,
        "version = \"5.0\"\nasset_kind = \"Mesh\"\nverbose = true\n",
    )
    .unwrap();

    let options = ContainerOptions::load(&config).unwrap();
    assert_eq!(options.version, VersionTag::parse("5.0").unwrap());
    assert!(options.version.has_extended_records());
    assert!(options.verbose);
    assert!(!options.ignore_payload);

    let path = write_pair(
        &temp_dir,
        "Foo",
        &RawFixture::static_mesh().with_extended(true),
    );
    let container = Container::open(&path, options).unwrap();
    assert_eq!(container.asset_kind(), AssetKind::StaticMesh);
}

#[test]
fn test_invalid_options_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("options.toml");

    fs::write(&config, "version = \"latest\"\n").unwrap();
    assert!(ContainerOptions::load(&config).is_err());

    fs::write(&config, "ignore_payload = \"yes\"\n").unwrap();
    assert!(ContainerOptions::load(&config).is_err());

    assert!(ContainerOptions::load(temp_dir.path().join("missing.toml")).is_err());
}

#[test]
fn test_summary_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pair(&temp_dir, "Foo", &RawFixture::static_mesh());
    let container = Container::open(&path, ContainerOptions::default()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&container.to_json().unwrap()).unwrap();

    assert_eq!(json["asset_path"], "/Game/Foo");
    assert_eq!(json["asset_name"], "Foo");
    assert_eq!(json["asset_kind"], "StaticMesh");
    assert_eq!(json["version_tag"], "ff7r");
    assert_eq!(json["header_version"], 6);
    assert_eq!(json["unversioned"], true);
    assert_eq!(json["header"]["name_count"], 8);

    assert_eq!(json["names"].as_array().unwrap().len(), 8);
    assert_eq!(json["names"][0]["hash"], "a00b0c00");

    assert_eq!(json["imports"][0]["class_name"], "StaticMesh");
    assert_eq!(json["exports"][1]["ignored"], true);
    assert_eq!(
        json["exports"][0]["crc32"],
        crc32fast::hash(&(0..40u8).collect::<Vec<_>>())
    );

    assert_eq!(json["file_data"][0]["kind"], "import");
    assert_eq!(json["file_data"][0]["name"], "Default__StaticMesh");
    assert_eq!(json["file_data"][2]["kind"], "direct");
    assert_eq!(json["file_data"][2]["value"], 1);
    assert_eq!(json["payload_trailer_len"], 4);
}

#[test]
fn test_metadata_only_summary() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pair(&temp_dir, "Foo", &RawFixture::static_mesh());
    let options = ContainerOptions::default().with_ignore_payload(true);
    let summary = Container::open(&path, options).unwrap().summary();

    assert!(summary.exports.iter().all(|e| e.crc32.is_none()));
    assert!(summary.payload_trailer_len.is_none());
    assert_eq!(summary.exports[0].size, 40);
}

#[test]
fn test_repack_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pair(&temp_dir, "Foo", &RawFixture::static_mesh());

    let options = ContainerOptions::default().with_asset_kind("StaticMesh");
    let mut container = Container::open(&path, options.clone()).unwrap();
    let index = container
        .exports()
        .iter()
        .position(|e| !e.ignore)
        .unwrap();
    container.replace_payload(index, b"replacement mesh body".to_vec()).unwrap();

    let out = temp_dir.path().join("mod").join("Foo.uexp");
    container.save(&out).unwrap();

    let reread = Container::open(&out, options).unwrap();
    assert_eq!(
        reread.exports()[index].payload.as_deref(),
        Some(&b"replacement mesh body"[..])
    );
    assert_eq!(reread.exports()[1].payload, container.exports()[1].payload);
    assert_eq!(reread.summary().names.len(), 8);
}
