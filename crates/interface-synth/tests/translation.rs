//! End-to-end translation tests: C# source in, TypeScript files out.

use csharp_parser::{parse, CompilationUnit};
use interface_synth::{GroupKey, PrimitiveMapping, SourceFile, Translation, Translator};
use pretty_assertions::assert_eq;

fn parse_all(sources: &[(&str, &str)]) -> Vec<(String, CompilationUnit)> {
    sources
        .iter()
        .map(|(path, source)| {
            let result = parse(source);
            assert!(result.errors.is_empty(), "{path}: {:?}", result.errors);
            (path.to_string(), result.unit)
        })
        .collect()
}

fn translate_with(translator: &Translator, sources: &[(&str, &str)]) -> Translation {
    let parsed = parse_all(sources);
    let files: Vec<SourceFile<'_>> = parsed
        .iter()
        .map(|(path, unit)| SourceFile { path, unit })
        .collect();
    translator.translate(&files)
}

fn translate(sources: &[(&str, &str)]) -> Translation {
    translate_with(&Translator::default(), sources)
}

/// Renders every output file with a header line, in group order.
fn render_all(translation: &Translation) -> String {
    let mut out = String::new();
    for group in translation.groups.values() {
        out.push_str(&format!("=== {} ===\n", group.file_path()));
        out.push_str(&group.render());
    }
    out.push_str("=== src/index.ts ===\n");
    out.push_str(&translation.render_index());
    out
}

#[test]
fn test_record_and_class_groups() {
    let translation = translate(&[
        (
            "Ordenes/ObtenerOrden.cs",
            r#"
namespace Mensajeria.Ordenes;

public record ObtenerOrdenRequest(int Id, string? Cliente) : IRequest<ObtenerOrdenResponse>;

public class ObtenerOrdenResponse
{
    public ObtenerOrdenResponse(int id) { Id = id; }
    public int Id { get; }
    public List<LineaDto> Lineas { get; set; } = new();
    public Dictionary<string, decimal> Totales { get; set; } = new();
    public DateTime? Entregada { get; set; }
}
"#,
        ),
        (
            "Ordenes/LineaDto.cs",
            "public record LineaDto(Guid ProductoId, int Cantidad, decimal Precio);",
        ),
    ]);
    insta::assert_snapshot!(render_all(&translation), @r"
    === src/ordenes/ordenes.ts ===
    export interface LineaDto {
      productoId: string;
      cantidad: number;
      precio: number;
    }

    export interface ObtenerOrdenRequest {
      id: number;
      cliente: string | null;
    }

    export interface ObtenerOrdenResponse {
      id: number;
      lineas: LineaDto[];
      totales: Record<string, number>;
      entregada: string | null;
    }

    === src/index.ts ===
    export * from './ordenes/ordenes';
    ");
}

#[test]
fn test_cross_group_import() {
    let translation = translate(&[
        (
            "Clientes/Cliente.cs",
            "public record Cliente(string Nombre, Direccion Direccion); public record Direccion(string Calle);",
        ),
        (
            "Ventas/Facturas/Factura.cs",
            "public record Factura(Cliente Cliente, Cliente[] Avales, Direccion? Envio, Linea[] Lineas); public record Linea(int N);",
        ),
    ]);
    insta::assert_snapshot!(render_all(&translation), @r"
    === src/clientes/clientes.ts ===
    export interface Cliente {
      nombre: string;
      direccion: Direccion;
    }

    export interface Direccion {
      calle: string;
    }

    === src/ventas/facturas/facturas.ts ===
    import { Cliente, Direccion } from '../../clientes/clientes';

    export interface Factura {
      cliente: Cliente;
      avales: Cliente[];
      envio: Direccion | null;
      lineas: Linea[];
    }

    export interface Linea {
      n: number;
    }

    === src/index.ts ===
    export * from './clientes/clientes';
    export * from './ventas/facturas/facturas';
    ");

    let clientes = &translation.groups[&GroupKey::from_dir("clientes")];
    assert!(clientes.imports.is_empty());
    let facturas = &translation.groups[&GroupKey::from_dir("ventas/facturas")];
    assert_eq!(facturas.imports.len(), 1);
}

#[test]
fn test_root_group_and_imports_into_it() {
    let translation = translate(&[
        ("Comun.cs", "public record Moneda(string Codigo);"),
        ("Pagos/Pago.cs", "public record Pago(Moneda Moneda, decimal Monto);"),
    ]);
    insta::assert_snapshot!(render_all(&translation), @r"
    === src/root.ts ===
    export interface Moneda {
      codigo: string;
    }

    === src/pagos/pagos.ts ===
    import { Moneda } from '../root';

    export interface Pago {
      moneda: Moneda;
      monto: number;
    }

    === src/index.ts ===
    export * from './root';
    export * from './pagos/pagos';
    ");
}

#[test]
fn test_record_parameter_and_property_with_same_name() {
    let translation = translate(&[(
        "R.cs",
        "public record R(int Id) { public int Id { get; init; } = Id; }",
    )]);
    assert_eq!(
        translation.groups[0].render(),
        "export interface R {\n  id: number;\n  id: number;\n}\n\n"
    );
}

#[test]
fn test_nested_declarations_each_emit() {
    let translation = translate(&[(
        "Paginas/Pagina.cs",
        r#"
public class Pagina<T>
{
    public IList<T> Elementos { get; set; }
    public record Cursor(string Siguiente)
    {
        public bool Fin { get; init; }
    }
}
"#,
    )]);
    insta::assert_snapshot!(translation.groups[0].render(), @r"
    export interface Pagina<T> {
      elementos: T[];
      fin: boolean;
    }

    export interface Cursor {
      siguiente: string;
      fin: boolean;
    }
    ");
}

#[test]
fn test_case_insensitive_grouping() {
    let translation = translate(&[
        ("Ordenes/A.cs", "public record A(int X);"),
        ("ordenes/B.cs", "public record B(A A);"),
    ]);
    assert_eq!(translation.groups.len(), 1);
    let group = &translation.groups[0];
    assert!(group.imports.is_empty());
    assert_eq!(group.declarations, vec!["A", "B"]);
}

#[test]
fn test_type_mapping_overrides() {
    let translator = Translator::new(PrimitiveMapping::with_overrides([("decimal", "string")]));
    let translation = translate_with(
        &translator,
        &[("Precio.cs", "public record Precio(decimal Valor, List<decimal?> Historial);")],
    );
    insta::assert_snapshot!(translation.groups[0].render(), @r"
    export interface Precio {
      valor: string;
      historial: (string | null)[];
    }
    ");
}

#[test]
fn test_translation_is_idempotent() {
    let sources = [
        ("A/A.cs", "public record A(B B, List<C> Cs);"),
        ("B/B.cs", "public record B(A? Back);"),
        ("C/C.cs", "public class C { public Dictionary<string, A[]> Map { get; set; } }"),
    ];
    let first = render_all(&translate(&sources));
    let second = render_all(&translate(&sources));
    assert_eq!(first, second);

    let mut reversed = sources;
    reversed.reverse();
    assert_eq!(first, render_all(&translate(&reversed)));
}

#[test]
fn test_unit_and_passthrough() {
    let translation = translate(&[(
        "Cmd.cs",
        "public record Cmd(Unit Result, Task<int> Pending, int[,] Grid, object Extra);",
    )]);
    insta::assert_snapshot!(translation.groups[0].render(), @r"
    export interface Cmd {
      result: void;
      pending: Task<int>;
      grid: int[,];
      extra: any;
    }
    ");
}

#[test]
fn test_no_declarations_no_groups() {
    let translation = translate(&[("Empty.cs", "namespace X; public interface I { }")]);
    assert!(translation.is_empty());
    assert_eq!(translation.render_index(), "");
}
