// Shared fixtures for factorygen integration tests
#![allow(dead_code)]

use factorygen::{FactoriesBuilder, RegistryId};
use indoc::indoc;
use std::fs;
use std::path::{Path, PathBuf};

pub const SHAPE: &str = indoc! {r#"
    export class Shape {
        area() { return 0; }
    }
"#};

pub const CIRCLE: &str = indoc! {r#"
    import { Shape } from './shape.js';

    export class Circle extends Shape {
        static typeName = 'circle';
        constructor(radius) {
            super();
            this.radius = radius;
        }
    }
"#};

pub const SQUARE: &str = indoc! {r#"
    import { Shape } from './shape.js';

    export class Square extends Shape {
        static typeName = 'square';
    }
"#};

/// Write `content` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// `src/shape.js`, `src/circle.js` and `src/square.js` under `root`.
pub fn shape_project(root: &Path) -> PathBuf {
    let src = root.join("src");
    write(&src, "shape.js", SHAPE);
    write(&src, "circle.js", CIRCLE);
    write(&src, "square.js", SQUARE);
    src
}

/// A default builder with a `Shape` factory written to `out/ShapeFactory.ts`.
pub fn shape_factories(root: &Path) -> (FactoriesBuilder, RegistryId, PathBuf) {
    let output = root.join("out/ShapeFactory.ts");
    let mut factories = FactoriesBuilder::default();
    let id = factories
        .declare_from_module(&root.join("src/shape.js"), "Shape", &output, "typeName")
        .unwrap();
    (factories, id, output)
}

pub fn registered_names(factories: &FactoriesBuilder, id: RegistryId) -> Vec<String> {
    factories
        .registry(id)
        .map(|registry| {
            registry
                .specialisations()
                .map(|s| s.export_name.clone())
                .collect()
        })
        .unwrap_or_default()
}
