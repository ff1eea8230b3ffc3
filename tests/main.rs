// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use instapatch::{
    config::{MetadataError, PACKAGE_JSON, PRODUCT_JSON},
    driver::{run, DriverError, Options},
    patch::Registry,
    platform::Platform,
    script::ScriptError,
    term::ReplayTerminal,
};

use anyhow::Result;
use indoc::formatdoc;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    env::current_dir,
    fs::{create_dir_all, read_to_string, write},
    path::PathBuf,
};

/// Fake installation inside the sealed working directory.
struct InstallFixture {
    root: PathBuf,
}

impl InstallFixture {
    fn new(product: &str, version: &str, locales: &[&str]) -> Result<Self> {
        let root = current_dir()?.join("codium");
        create_dir_all(root.join("resources/app"))?;
        write(
            root.join(PRODUCT_JSON),
            format!(r#"{{ "nameShort": "{product}", "nameLong": "{product}" }}"#),
        )?;
        write(
            root.join(PACKAGE_JSON),
            format!(r#"{{ "name": "code-oss-dev", "version": "{version}" }}"#),
        )?;

        // INVARIANT: Locale directory exists even when no locale is shipped.
        create_dir_all(root.join("locales"))?;
        for locale in locales {
            write(root.join("locales").join(format!("{locale}.pak")), locale)?;
        }

        Ok(Self { root })
    }

    fn locale(&self, name: &str) -> PathBuf {
        self.root.join("locales").join(format!("{name}.pak"))
    }

    fn options(&self, patches: &[&str]) -> Options {
        Options {
            install: self.root.clone(),
            patches: patches.iter().map(ToString::to_string).collect(),
            output: None,
            dry_run: false,
        }
    }

    fn output(&self) -> PathBuf {
        self.root.with_file_name("replay.bat")
    }
}

fn separator() -> String {
    "-".repeat(70)
}

#[sealed_test]
fn locale_keeps_selection_and_writes_script() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &["de", "en-US", "fr"])?;
    let terminal = ReplayTerminal::new(["en-us"]);
    let options = Options {
        output: Some(fixture.output()),
        ..fixture.options(&["locale"])
    };

    let summary = run(&options, &Registry::builtin(), terminal.clone())?;
    assert_eq!(summary.applied, vec!["locale"]);
    assert!(summary.script_written);

    assert!(!fixture.locale("de").exists());
    assert!(fixture.locale("en-US").exists());
    assert!(!fixture.locale("fr").exists());

    let sep = separator();
    let expect = formatdoc! {r#"
        @echo off
        rem This script was created AUTOMATICALLY using instapatch v{pkg}
        rem for VSCodium v1.102.35058 on {host}.
        rem {blank}
        rem Applied patches:
        rem   locale
        set "INSTALL_ROOT={root}"
        rem {sep}
        rem locale
        rem {sep}
        echo :: Deleting %INSTALL_ROOT%\locales\de.pak...
        del /F /Q "%INSTALL_ROOT%\locales\de.pak"
        echo :: Deleting %INSTALL_ROOT%\locales\fr.pak...
        del /F /Q "%INSTALL_ROOT%\locales\fr.pak""#,
        pkg = env!("CARGO_PKG_VERSION"),
        host = Platform::host(),
        root = fixture.root.display(),
        blank = "",
    };
    assert_eq!(read_to_string(fixture.output())?, expect);

    let lines = terminal.lines();
    assert!(lines.contains(&":: Starting 'locale'...".to_string()));
    assert!(lines.contains(&"[locale] [+] Removed locales/de.pak.".to_string()));
    assert!(lines.contains(&format!("[+] Wrote script to {}.", fixture.output().display())));

    Ok(())
}

#[sealed_test]
fn dry_run_leaves_installation_untouched() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &["de", "en-US"])?;
    let terminal = ReplayTerminal::new(["2"]);
    let options = Options {
        output: Some(fixture.output()),
        dry_run: true,
        ..fixture.options(&["locale"])
    };

    let summary = run(&options, &Registry::builtin(), terminal.clone())?;
    assert_eq!(summary.applied, vec!["locale"]);
    assert!(summary.script_written);
    assert!(fixture.locale("de").exists());
    assert!(fixture.locale("en-US").exists());

    let script = read_to_string(fixture.output())?;
    assert!(script.contains(r#"del /F /Q "%INSTALL_ROOT%\locales\de.pak""#));
    assert!(!script.contains("en-US.pak"));

    let lines = terminal.lines();
    assert_eq!(
        lines.first().map(String::as_str),
        Some("[!] This is a dry run. No changes will be made to the existing installation.")
    );

    Ok(())
}

#[sealed_test]
fn dry_run_without_script_only_reports() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &["de", "en-US"])?;
    let terminal = ReplayTerminal::new(["de"]);
    let options = Options {
        dry_run: true,
        ..fixture.options(&["locale"])
    };

    let summary = run(&options, &Registry::builtin(), terminal)?;
    assert_eq!(summary.applied, vec!["locale"]);
    assert!(!summary.script_written);
    assert!(fixture.locale("de").exists());
    assert!(fixture.locale("en-US").exists());

    Ok(())
}

#[sealed_test]
fn skipped_patches_write_no_script() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.90.2", &["de", "en-US"])?;
    let terminal = ReplayTerminal::new(["y"]);
    let options = Options {
        output: Some(fixture.output()),
        ..fixture.options(&["locale"])
    };

    let summary = run(&options, &Registry::builtin(), terminal.clone())?;
    assert_eq!(summary.skipped, vec!["locale"]);
    assert!(summary.applied.is_empty());
    assert!(!summary.script_written);
    assert!(!fixture.output().exists());
    assert!(fixture.locale("de").exists());

    assert_eq!(terminal.prompts(), vec!["[locale] Skip the patch? [Y/n]: "]);
    let lines = terminal.lines();
    assert!(lines.contains(
        &"[locale] [!] VSCodium v1.90.2 is not supported by the patch (minimal: v1.102.35058)."
            .to_string()
    ));
    assert_eq!(lines.last().map(String::as_str), Some(":: No patches to apply."));

    Ok(())
}

#[sealed_test]
fn declined_skip_applies_anyway() -> Result<()> {
    let fixture = InstallFixture::new("Code - OSS", "1.102.35058", &["de", "en-US"])?;
    let terminal = ReplayTerminal::new(["N", "en-us"]);

    let summary = run(&fixture.options(&["locale"]), &Registry::builtin(), terminal.clone())?;
    assert_eq!(summary.applied, vec!["locale"]);
    assert!(!fixture.locale("de").exists());
    assert!(fixture.locale("en-US").exists());
    assert_eq!(terminal.remaining(), 0);

    Ok(())
}

#[sealed_test]
fn unknown_and_repeated_names_are_reported() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &["de", "en-US"])?;
    let terminal = ReplayTerminal::new(["1,2"]);
    let options = fixture.options(&["missing", "locale", "locale"]);

    let summary = run(&options, &Registry::builtin(), terminal.clone())?;
    assert_eq!(summary.missing, vec!["missing"]);
    assert_eq!(summary.applied, vec!["locale"]);
    assert_eq!(terminal.prompts().len(), 1);

    let lines = terminal.lines();
    assert!(lines.contains(&"[!] Patch 'missing' not found. Skipping...".to_string()));
    assert!(lines.contains(
        &"[!] Patch 'locale' was requested more than once. Ignoring the repeat.".to_string()
    ));

    Ok(())
}

#[sealed_test]
fn unsupported_output_fails_before_prompting() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.90.2", &["de"])?;
    let terminal = ReplayTerminal::new(["n", "de"]);
    let options = Options {
        output: Some(fixture.root.with_file_name("replay.sh")),
        ..fixture.options(&["locale"])
    };

    let result = run(&options, &Registry::builtin(), terminal.clone());
    assert!(matches!(
        result,
        Err(DriverError::Script(ScriptError::UnsupportedExtension { .. }))
    ));
    assert!(terminal.prompts().is_empty());
    assert!(fixture.locale("de").exists());

    Ok(())
}

#[sealed_test]
fn missing_metadata_is_fatal() -> Result<()> {
    let root = current_dir()?.join("empty");
    create_dir_all(&root)?;
    let options = Options {
        install: root,
        patches: vec!["locale".into()],
        ..Options::default()
    };

    let result = run(&options, &Registry::builtin(), ReplayTerminal::default());
    assert!(matches!(
        result,
        Err(DriverError::Metadata(MetadataError::InvalidInstallation { .. }))
    ));

    Ok(())
}

#[sealed_test]
fn cancelled_selection_stops_run() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &["de", "en-US"])?;
    let terminal = ReplayTerminal::with_answers([None]);
    let options = Options {
        output: Some(fixture.output()),
        ..fixture.options(&["locale"])
    };

    let result = run(&options, &Registry::builtin(), terminal);
    assert!(result.is_err_and(|err| err.is_cancelled()));
    assert!(fixture.locale("de").exists());
    assert!(!fixture.output().exists());

    Ok(())
}

#[sealed_test]
fn cancelled_skip_prompt_stops_run() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.0", &["de"])?;
    let terminal = ReplayTerminal::default();

    let result = run(&fixture.options(&["locale"]), &Registry::builtin(), terminal);
    assert!(result.is_err_and(|err| err.is_cancelled()));

    Ok(())
}

#[sealed_test]
fn invalid_selection_reprompts() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &["de", "en-US"])?;
    let terminal = ReplayTerminal::new(["de, en-us", "3", "de"]);

    run(&fixture.options(&["locale"]), &Registry::builtin(), terminal.clone())?;
    assert_eq!(terminal.prompts().len(), 3);
    assert!(fixture.locale("de").exists());
    assert!(!fixture.locale("en-US").exists());

    let lines = terminal.lines();
    assert!(lines.contains(
        &"[locale] [!] Invalid input ' en-us'. Input a valid value or number.".to_string()
    ));
    assert!(lines
        .contains(&"[locale] [!] Invalid input '3'. Input a valid value or number.".to_string()));

    Ok(())
}

#[sealed_test]
fn missing_locales_apply_nothing() -> Result<()> {
    let fixture = InstallFixture::new("VSCodium", "1.102.35058", &[])?;
    let terminal = ReplayTerminal::default();
    let options = Options {
        output: Some(fixture.output()),
        ..fixture.options(&["locale"])
    };

    let summary = run(&options, &Registry::builtin(), terminal.clone())?;
    assert_eq!(summary.applied, vec!["locale"]);
    assert!(terminal.prompts().is_empty());
    assert!(terminal
        .lines()
        .contains(&"[locale] [!] No locales found. Nothing to do.".to_string()));

    // INVARIANT: Preamble and section header still count as recorded lines.
    let script = read_to_string(fixture.output())?;
    assert!(script.starts_with("@echo off"));
    assert!(script.ends_with(&format!("rem {}", separator())));

    Ok(())
}
