mod common;

use common::{registered_names, shape_factories, shape_project, write, CIRCLE};
use factorygen::io::paths::normalize;
use factorygen::{unique_identifier, FactoryGenError, Severity};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn body(generated: &str) -> &str {
    generated
        .split_once("*/\n\n")
        .map(|(_, body)| body)
        .unwrap_or(generated)
}

#[test]
fn test_initial_build_writes_factory() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    let (mut factories, id, output) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle", "Square"]);
    assert!(factories.diagnostics().is_empty());

    let circle = unique_identifier(&normalize(&src.join("circle.js")), "Circle");
    let square = unique_identifier(&normalize(&src.join("square.js")), "Square");
    let generated = fs::read_to_string(&output).unwrap();
    let expected_head = format!(
        indoc! {r#"
            import {{ Shape }} from "../src/shape.js";
            import {{ Circle as {c} }} from "../src/circle.js";
            import {{ Square as {s} }} from "../src/square.js";
            const typeMappings = {{
                circle: {c},
                square: {s}
            }} as const;
            export type Specialisation = keyof typeof typeMappings;
        "#},
        c = circle,
        s = square
    );
    assert!(
        body(&generated).starts_with(&expected_head),
        "unexpected output:\n{}",
        generated
    );

    assert!(generated.starts_with("/*****"));
    assert!(generated.contains(" * WARNING: This file is auto-generated by factorygen."));
    assert!(generated.contains(" * ../src/circle.js"));
    assert!(generated.contains(" * ../src/square.js"));
    assert!(generated.contains("// @ts-ignore"));
    assert!(generated.contains("type BaseClass = Shape;"));
    assert!(generated.contains("export class ShapeFactoryCreateError extends Error {"));
    assert!(generated.contains(
        "static create(typeName: Specialisation, ...init: any[]): BaseClass {"
    ));
    assert!(generated.contains("        const constr = typeMappings[typeName];\n        if (!constr) {\n"));
    assert!(generated.contains(
        r#"            throw new ShapeFactoryCreateError(`${typeName} is not a valid value for \`typeName\``);"#
    ));
    assert!(generated.contains("return new (constr as unknown as SpreadConstructor)(...init);"));
}

#[test]
fn test_constant_discriminator_is_read_at_runtime() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    let tri = write(
        &src,
        "tri.js",
        indoc! {r#"
            import { Shape } from './shape.js';
            const KIND = 'triangle';
            export class Tri extends Shape {
                static typeName = KIND;
            }
        "#},
    );
    let (mut factories, id, output) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle", "Square", "Tri"]);
    let identifier = unique_identifier(&normalize(&tri), "Tri");
    let generated = fs::read_to_string(&output).unwrap();
    assert!(generated.contains(&format!("    [{id}.typeName]: {id}\n", id = identifier)));
    assert!(!generated.contains("KIND"));

    let diagnostics: Vec<_> = factories.diagnostics().iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert!(diagnostics[0].message.contains("not statically known"));
}

#[test]
fn test_number_and_string_discriminators_share_a_key() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    write(&src, "shape.js", common::SHAPE);
    write(
        &src,
        "five.js",
        "import { Shape } from './shape.js';\nexport class Five extends Shape { static typeName = 5; }\n",
    );
    let quoted = write(
        &src,
        "quoted.js",
        "import { Shape } from './shape.js';\nexport class Quoted extends Shape { static typeName = '5'; }\n",
    );
    let (mut factories, _, output) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    let generated = fs::read_to_string(&output).unwrap();
    let quoted_id = unique_identifier(&normalize(&quoted), "Quoted");
    assert!(generated.contains(&format!("    5: {}\n}} as const;", quoted_id)));
    assert!(!generated.contains("\"5\":"));
    assert!(factories
        .diagnostics()
        .iter()
        .any(|d| d.message == "Multiple classes use the same value for typeName (5)"));
}

#[test]
fn test_generation_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());

    let (mut first, _, output) = shape_factories(dir.path());
    first.run(&src, &[]).unwrap();
    let once = fs::read_to_string(&output).unwrap();

    let (mut second, _, _) = shape_factories(dir.path());
    second.run(&src, &[]).unwrap();
    let twice = fs::read_to_string(&output).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_edit_removes_export() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    let (mut factories, id, output) = shape_factories(dir.path());
    factories.run(&src, &[]).unwrap();

    let square = write(&src, "square.js", "export const notAClass = 1;\n");
    let affected = factories.consider_file(&square, &[]);
    assert_eq!(affected, vec![id]);
    factories.regenerate(&affected, "square.js changed").unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle"]);
    let generated = fs::read_to_string(&output).unwrap();
    assert!(!generated.contains("square"));
    assert!(generated.contains("circle: cls_"));
}

#[test]
fn test_added_and_deleted_files() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    let (mut factories, id, _) = shape_factories(dir.path());
    factories.run(&src, &[]).unwrap();

    let triangle = write(
        &src,
        "triangle.js",
        "import { Shape } from './shape.js';\nexport class Triangle extends Shape { static typeName = 'triangle'; }\n",
    );
    assert_eq!(factories.consider_file(&triangle, &[]), vec![id]);
    assert_eq!(
        registered_names(&factories, id),
        vec!["Circle", "Square", "Triangle"]
    );

    fs::remove_file(&triangle).unwrap();
    assert_eq!(factories.consider_file(&triangle, &[]), vec![id]);
    assert_eq!(registered_names(&factories, id), vec!["Circle", "Square"]);

    // an unrelated file changes nothing
    let util = write(&src, "util.js", "export function helper() {}\n");
    assert!(factories.consider_file(&util, &[]).is_empty());
    assert!(factories.diagnostics().is_empty());
}

#[test]
fn test_duplicate_discriminator_warns_and_last_wins() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    write(
        &src,
        "disc.js",
        "import { Shape } from './shape.js';\nexport class Disc extends Shape { static typeName = 'circle'; }\n",
    );
    let (mut factories, id, output) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle", "Disc", "Square"]);
    let warnings: Vec<_> = factories
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].message,
        "Multiple classes use the same value for typeName (circle)"
    );
    assert!(warnings[0].mentions_file("circle.js"));
    assert!(warnings[0].mentions_file("disc.js"));

    let disc = unique_identifier(&normalize(&src.join("disc.js")), "Disc");
    let generated = fs::read_to_string(&output).unwrap();
    assert!(generated.contains(&format!("    circle: {},\n", disc)));
    assert_eq!(generated.matches("circle:").count(), 1);
}

#[test]
fn test_inherited_and_assigned_discriminators() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    write(&src, "shape.js", common::SHAPE);
    write(
        &src,
        "round.js",
        "import { Shape } from './shape.js';\nexport class Round extends Shape { static typeName = 'round'; }\n",
    );
    write(
        &src,
        "oval.js",
        "import { Round } from './round.js';\nexport class Oval extends Round {}\n",
    );
    write(
        &src,
        "ring.js",
        indoc! {r#"
            import { Shape } from './shape.js';
            export class Ring extends Shape {}
            Ring.typeName = 'ring';
        "#},
    );
    let (mut factories, id, output) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Oval", "Ring", "Round"]);
    let generated = fs::read_to_string(&output).unwrap();
    assert!(generated.contains("ring: cls_"));
    // Oval inherits Round's value
    assert!(factories
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("same value for typeName (round)")));
}

#[test]
fn test_missing_discriminator_is_reported_but_registered() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    write(
        &src,
        "blob.js",
        "import { Shape } from './shape.js';\nexport class Blob extends Shape {}\n",
    );
    let (mut factories, id, output) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert!(registered_names(&factories, id).contains(&"Blob".to_string()));
    let errors: Vec<_> = factories
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(errors, vec!["Blob is missing discriminating property typeName"]);
    assert!(fs::read_to_string(&output).unwrap().contains("undefined: cls_"));
}

#[test]
fn test_unrelated_class_sharing_the_base_name_warns() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    write(&src, "legacy/shape.js", common::SHAPE);
    write(
        &src,
        "legacy/blob.js",
        "import { Shape } from './shape.js';\nexport class Blob extends Shape { static typeName = 'blob'; }\n",
    );
    let (mut factories, id, _) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert!(!registered_names(&factories, id).contains(&"Blob".to_string()));
    let warning = factories
        .diagnostics()
        .iter()
        .find(|d| d.message.starts_with("Blob extends a class named Shape"))
        .expect("name-match warning");
    assert!(warning.mentions_file("legacy/blob.js"));
    assert!(warning.mentions_file("legacy/shape.js"));
    assert_eq!(warning.notes.len(), 2);
}

#[test]
fn test_ignored_generator_and_compiled_output_are_skipped() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    write(&src, "vendor/circle.js", &CIRCLE.replace("./shape.js", "../shape.js").replace("Circle", "VendorCircle"));
    let generator = write(
        &src,
        "generate.js",
        "import { Shape } from './shape.js';\nexport class Probe extends Shape { static typeName = 'probe'; }\n",
    );

    // a compiled copy of the generated factory, mapped back to it
    let output = dir.path().join("out/ShapeFactory.ts");
    write(
        &src,
        "ShapeFactory.js",
        "import { Shape } from './shape.js';\nexport class Echo extends Shape { static typeName = 'echo'; }\n",
    );
    write(
        &src,
        "ShapeFactory.js.map",
        r#"{"version":3,"sources":["../out/ShapeFactory.ts"],"names":[],"mappings":"AAAA"}"#,
    );

    let mut factories = factorygen::FactoriesBuilder::default().with_generator_module(&generator);
    let id = factories
        .declare_from_module(&src.join("shape.js"), "Shape", &output, "typeName")
        .unwrap();
    factories.run(&src, &[src.join("vendor")]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle", "Square"]);
}

#[test]
fn test_unloadable_module_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    write(&src, "broken.js", "export class {{{\n");
    let (mut factories, id, _) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle", "Square"]);
    assert!(factories
        .diagnostics()
        .iter()
        .any(|d| d.message.starts_with("Could not load module") && d.message.contains("broken.js")));
}

#[test]
fn test_run_twice_fails() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    let (mut factories, _, _) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();
    assert!(matches!(
        factories.run(&src, &[]),
        Err(FactoryGenError::AlreadyRunning)
    ));
}

#[test]
fn test_re_exported_class_is_registered_under_each_module() {
    let dir = TempDir::new().unwrap();
    let src = shape_project(dir.path());
    write(&src, "index.js", "export { Circle as Round } from './circle.js';\nexport * from './square.js';\n");
    let (mut factories, id, _) = shape_factories(dir.path());

    factories.run(&src, &[]).unwrap();

    assert_eq!(
        registered_names(&factories, id),
        vec!["Circle", "Round", "Square", "Square"]
    );
}

#[test]
fn test_base_re_exported_from_index_is_imported_from_index() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    write(&src, "shape.js", "export default class Shape {}\n");
    let index = write(&src, "index.js", "export { default as Shape } from './shape.js';\n");
    write(
        &src,
        "circle.js",
        "import Shape from './shape.js';\nexport class Circle extends Shape { static typeName = 'circle'; }\n",
    );
    let output = dir.path().join("out/ShapeFactory.ts");
    let mut factories = factorygen::FactoriesBuilder::default();
    let id = factories
        .declare_from_module(&index, "Shape", &output, "typeName")
        .unwrap();

    factories.run(&src, &[]).unwrap();

    assert_eq!(registered_names(&factories, id), vec!["Circle"]);
    let generated = fs::read_to_string(&output).unwrap();
    assert!(body(&generated).starts_with("import { Shape } from \"../src/index.js\";\n"));
    assert!(!generated.contains("from \"../src/shape.js\""));
}
