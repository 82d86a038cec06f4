//! npm package scaffolding written next to the generated sources.

use crate::config::PackageInfo;
use interface_synth::PrimitiveMapping;
use serde::Serialize;
use std::collections::BTreeMap;

/// The `tsconfig.json` written into every package.
pub const TSCONFIG_JSON: &str = r#"{
  "compilerOptions": {
    "target": "es2016",
    "module": "commonjs",
    "declaration": true,
    "outDir": "./dist",
    "esModuleInterop": true,
    "forceConsistentCasingInFileNames": true,
    "strict": true,
    "skipLibCheck": true
  },
  "include": ["src/**/*"],
  "exclude": ["node_modules", "**/*.test.ts"]
}
"#;

#[derive(Debug, Serialize)]
struct Repository<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    url: &'a str,
}

/// `package.json` contents. Field order is the order written.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest<'a> {
    name: String,
    version: &'a str,
    description: &'static str,
    main: &'static str,
    types: &'static str,
    scripts: BTreeMap<&'static str, &'static str>,
    keywords: [&'static str; 2],
    author: &'a str,
    license: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<Repository<'a>>,
    dev_dependencies: BTreeMap<&'static str, &'static str>,
}

/// Renders `package.json`.
pub fn package_json(info: &PackageInfo) -> String {
    let manifest = PackageManifest {
        name: info.full_name(),
        version: &info.version,
        description: "TypeScript interfaces generated from C# records and classes",
        main: "dist/index.js",
        types: "dist/index.d.ts",
        scripts: BTreeMap::from([("build", "tsc"), ("prepare", "npm run build")]),
        keywords: ["typescript", "interfaces"],
        author: &info.author,
        license: &info.license,
        repository: info
            .repository
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| Repository { kind: "git", url }),
        dev_dependencies: BTreeMap::from([("typescript", "^5.0.0")]),
    };
    // Serializing plain strings and maps cannot fail.
    serde_json::to_string_pretty(&manifest).unwrap_or_default() + "\n"
}

/// Renders `README.md`.
pub fn readme(info: &PackageInfo) -> String {
    let name = info.full_name();
    format!(
        r#"# {name}

TypeScript interfaces generated from C# records and classes.

## Installation

```bash
npm install {name}
```

## Usage

```typescript
import type {{ ObtenerOrdenRequest }} from '{name}';

const request: ObtenerOrdenRequest = {{ id: 123 }};
```

Every source directory becomes one module under `src/`, and `src/index.ts`
re-exports all of them.

See [docs/PROCESS.md](./docs/PROCESS.md) for how the interfaces are generated
and [docs/EXAMPLES.md](./docs/EXAMPLES.md) for usage examples.
"#
    )
}

/// Renders `docs/PROCESS.md`, including the primitive mapping table in use.
pub fn process_doc(primitives: &PrimitiveMapping) -> String {
    let mut out = String::from(
        r#"# Generation process

The interfaces in this package are generated from the C# sources of the
project. Do not edit them by hand; regenerate instead.

## Declarations

- Records (`record`, `record class`, `record struct`) contribute their
  positional parameters first, then every property in their body.
- Classes and structs contribute every property in their body.
- Nested declarations are emitted as interfaces of their own; their properties
  are also included in the enclosing declaration.
- Member names are camelCased.

## Type mapping

| C# | TypeScript |
|----|------------|
"#,
    );
    for (cs, ts) in primitives.entries() {
        out.push_str(&format!("| {cs} | {ts} |\n"));
    }
    out.push_str(
        r#"| T[] | T[] |
| T? | T \| null |
| List<T>, IEnumerable<T>, ICollection<T>, IList<T> | T[] |
| Dictionary<K, V> | Record<K, V> |
| Unit | void |

Names declared in the project are imported from the module of the directory
that declares them. Any other name is emitted unchanged.
"#,
    );
    out
}

/// Renders `docs/EXAMPLES.md` with usage snippets importing from the package.
pub fn examples_doc(info: &PackageInfo) -> String {
    let name = info.full_name();
    format!(
        r#"# Usage examples

The snippets below import from `{name}`. Replace the interface names with
the ones declared in your project.

## Typing HTTP calls

```typescript
import axios from 'axios';
import type {{ ObtenerOrdenRequest, ObtenerOrdenResponse }} from '{name}';

async function obtenerOrden(id: number): Promise<ObtenerOrdenResponse> {{
  const request: ObtenerOrdenRequest = {{ id }};
  const response = await axios.post<ObtenerOrdenResponse>('/api/orden/obtener', request);
  return response.data;
}}
```

## Typing fetch

```typescript
import type {{ ObtenerOrdenResponse }} from '{name}';

async function cargarOrden(id: number): Promise<ObtenerOrdenResponse> {{
  const response = await fetch(`/api/orden/${{id}}`);
  return (await response.json()) as ObtenerOrdenResponse;
}}
```

## Nullable members

Nullable C# members become `T | null`, so they must be checked before use:

```typescript
import type {{ ObtenerOrdenResponse }} from '{name}';

function contarClientes(response: ObtenerOrdenResponse): number {{
  return response.clientes?.length ?? 0;
}}
```

## Form state

```typescript
import {{ useForm }} from 'react-hook-form';
import type {{ ObtenerOrdenRequest }} from '{name}';

function OrdenForm() {{
  const {{ register, handleSubmit }} = useForm<ObtenerOrdenRequest>();
  const onSubmit = (data: ObtenerOrdenRequest) => console.log(data.id);
  return (
    <form onSubmit={{handleSubmit(onSubmit)}}>
      <input type='number' {{...register('id', {{ valueAsNumber: true }})}} />
    </form>
  );
}}
```
"#
    )
}
