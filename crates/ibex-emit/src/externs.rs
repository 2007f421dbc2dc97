// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_ast::{ExternDecl, TypeName};

use crate::render::escape_str;

fn scalar_kind(ty: &TypeName) -> &'static str {
    let lower = ty.0.to_ascii_lowercase();
    if lower.contains("int") {
        "Int"
    } else if lower.contains("float") || lower.contains("double") {
        "Float"
    } else {
        "Str"
    }
}

pub fn is_table_return(ty: &TypeName) -> bool {
    ty.0.eq_ignore_ascii_case("DataFrame")
}

/// Builds the `ExternRegistry` an emitted `Update`/`Update` (grouped)
/// call needs: every non-table extern is registered as a scalar
/// function that unwraps its arguments by declared parameter type,
/// calls the directly-imported free function, and wraps the result
/// back into a `ScalarValue` by declared return type.
///
/// Table externs (`read_csv` and friends) are never registered here.
/// `ExternCall` nodes that produce a table are emitted as a direct
/// call to the imported function instead, since the callee is known
/// statically at emission time.
pub fn emit_registration(externs: &[ExternDecl]) -> String {
    let mut out = String::new();
    out.push_str("    let __externs = ibex_extern::ExternRegistry::new();\n");
    for decl in externs {
        if is_table_return(&decl.return_type) {
            continue;
        }
        out.push_str(&format!(
            "    __externs.register_scalar(\"{}\".to_string(), |__args| {{\n",
            escape_str(&decl.name)
        ));
        for (i, param) in decl.params.iter().enumerate() {
            let kind = scalar_kind(&param.ty);
            out.push_str(&format!(
                "        let __a{i} = match __args.get({i}) {{ Some(ibex_extern::ScalarValue::{kind}(v)) => v.clone(), _ => return Err(\"{name}: bad argument {i}\".to_string()) }};\n",
                i = i,
                kind = kind,
                name = escape_str(&decl.name),
            ));
        }
        let call_args = (0..decl.params.len()).map(|i| format!("__a{i}")).collect::<Vec<_>>().join(", ");
        let ret_kind = scalar_kind(&decl.return_type);
        out.push_str(&format!(
            "        Ok(ibex_extern::ScalarValue::{ret_kind}({}::{}({call_args})))\n",
            decl.source, decl.name,
        ));
        out.push_str("    });\n");
    }
    out.push_str("    let __externs_read = __externs.read();\n");
    out
}
