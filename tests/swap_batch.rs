use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tagswap::swap::{run_batch, transform, BatchOptions, SwapSpec};
use tempfile::TempDir;

const IMPORT: &str = r#"import MorphingLoader from "@/app/components/ui/loading";"#;
const CANONICAL: &str = r#"<MorphingLoader size="small" showThemeText={false} />"#;

const SAVE_BUTTON: &str = r#""use client";

import { Loader2, Check } from "lucide-react";
import { Button } from "@/components/ui/button";

export function SaveButton({ saving, saved }) {
  return (
    <Button disabled={saving}>
      {saving ? <Loader2 className="mr-2 h-4 w-4 animate-spin" /> : <Check />}
      {saving && <Loader2 />}
      Save
    </Button>
  );
}
"#;

const PAGE: &str = r#"import { Loader2 } from 'lucide-react'

export default function Page() {
  return <div><Loader2/></div>
}
"#;

const PLAIN: &str = "export const answer = 42;\n";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn tagswap(dir: &TempDir, args: &[&str]) -> (Value, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_tagswap"))
        .args(args)
        .current_dir(dir.path())
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    (json, output.status.code().unwrap())
}

#[test]
fn batch_rewrites_mixed_units_and_is_stable() {
    let dir = TempDir::new().unwrap();
    let save = write(&dir, "components/save-button.tsx", SAVE_BUTTON);
    let page = write(&dir, "app/page.jsx", PAGE);
    let plain = write(&dir, "lib/plain.ts", PLAIN);
    let options = BatchOptions {
        write: true,
        stop_on_error: false,
    };
    let units = vec![save.clone(), page.clone(), plain.clone()];

    let report = run_batch(&units, &SwapSpec::default(), &options).unwrap();
    assert_eq!(report.result.summary.changed, 2);
    assert_eq!(report.result.summary.unchanged, 1);

    let save_out = fs::read_to_string(&save).unwrap();
    assert!(save_out.starts_with("\"use client\";\n\nimport { Check } from \"lucide-react\";\n"));
    assert_eq!(save_out.matches(IMPORT).count(), 1);
    assert_eq!(save_out.matches(CANONICAL).count(), 2);
    assert!(!save_out.contains("Loader2"));

    // Quote and semicolon style follow the unit's own imports.
    let page_out = fs::read_to_string(&page).unwrap();
    assert_eq!(
        page_out,
        format!(
            "import MorphingLoader from '@/app/components/ui/loading'\n\nexport default function Page() {{\n  return <div>{}</div>\n}}\n",
            CANONICAL
        )
    );

    assert_eq!(fs::read_to_string(&plain).unwrap(), PLAIN);

    let again = run_batch(&units, &SwapSpec::default(), &options).unwrap();
    assert_eq!(again.result.summary.changed, 0);
    assert_eq!(again.result.summary.unchanged, 3);
}

#[test]
fn transform_preserves_crlf_line_endings() {
    let text = "import { Loader2 } from \"lucide-react\";\r\nimport x from \"x\";\r\n\r\nconst a = <Loader2 />;\r\n";
    let result = transform(text, &SwapSpec::default());
    assert!(result.changed);
    assert!(!result.text.replace("\r\n", "").contains('\n'));
    assert!(result.text.contains(&format!("{}\r\n", IMPORT)));
}

#[test]
fn transform_handles_multiline_import_list() {
    let text = "import {\n  Check,\n  Loader2,\n  X,\n} from \"lucide-react\";\n\nconst a = <Loader2 />;\n";
    let result = transform(text, &SwapSpec::default());
    assert!(result.text.contains("import {\n  Check,\n  X,\n} from \"lucide-react\";"));
    assert!(result.text.contains(CANONICAL));
    assert_eq!(result.text.matches("Loader2").count(), 0);
}

#[test]
fn cli_run_dry_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    write(&dir, "app/page.jsx", PAGE);

    let (json, code) = tagswap(&dir, &["run", "app/page.jsx", "missing.jsx"]);

    assert_eq!(code, 0);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["command"], "run");
    assert_eq!(json["data"]["applied"], false);
    assert_eq!(json["data"]["summary"]["changed"], 1);
    assert_eq!(json["data"]["summary"]["not_found"], 1);
    assert_eq!(json["data"]["items"][0]["status"], "changed");
    assert_eq!(json["data"]["items"][0]["usages"]["bare_tight"], 1);
    assert_eq!(json["data"]["items"][1]["status"], "not_found");
    assert_eq!(fs::read_to_string(dir.path().join("app/page.jsx")).unwrap(), PAGE);
}

#[test]
fn cli_run_write_with_path_discovery_and_config_exclude() {
    let dir = TempDir::new().unwrap();
    write(&dir, "app/page.jsx", PAGE);
    write(&dir, "app/page.test.jsx", PAGE);
    write(&dir, "node_modules/pkg/index.js", PAGE);
    write(&dir, "tagswap.json", r#"{"exclude": ["**/*.test.jsx"]}"#);

    let (json, code) = tagswap(&dir, &["run", "--path", ".", "--write"]);

    assert_eq!(code, 0);
    assert_eq!(json["data"]["applied"], true);
    assert_eq!(json["data"]["summary"]["total"], 1);
    assert!(json["data"]["config"].as_str().unwrap().ends_with("tagswap.json"));
    assert!(!fs::read_to_string(dir.path().join("app/page.jsx"))
        .unwrap()
        .contains("Loader2"));
    assert_eq!(
        fs::read_to_string(dir.path().join("app/page.test.jsx")).unwrap(),
        PAGE
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("node_modules/pkg/index.js")).unwrap(),
        PAGE
    );
}

#[test]
fn cli_run_without_units_is_validation_error() {
    let dir = TempDir::new().unwrap();

    let (json, code) = tagswap(&dir, &["run"]);

    assert_eq!(code, 2);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "validation.missing_argument");
}

#[test]
fn cli_missing_explicit_config_is_error() {
    let dir = TempDir::new().unwrap();

    let (json, code) = tagswap(&dir, &["config", "--config", "nope.json"]);

    assert_eq!(code, 2);
    assert_eq!(json["error"]["code"], "config.missing_file");
}

#[test]
fn cli_config_reports_invocation() {
    let dir = TempDir::new().unwrap();

    let (json, code) = tagswap(&dir, &["config"]);

    assert_eq!(code, 0);
    assert_eq!(json["data"]["invocation"], CANONICAL);
    assert_eq!(json["data"]["import"], IMPORT);
    assert_eq!(json["data"]["config"]["swap"]["target"]["symbol"], "Loader2");
}

#[test]
fn cli_show_prints_transformed_text() {
    let dir = TempDir::new().unwrap();
    write(&dir, "app/page.jsx", PAGE);

    let output = Command::new(env!("CARGO_BIN_EXE_tagswap"))
        .args(["show", "app/page.jsx"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(CANONICAL));
    assert_eq!(fs::read_to_string(dir.path().join("app/page.jsx")).unwrap(), PAGE);
}
