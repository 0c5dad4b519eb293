use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, GenericArgument, ItemFn, LitStr, Pat, PathArguments, Type};
use proc_macro_crate::{crate_name, FoundCrate};

/// Resolve host crate path (equivalent to `$crate`)
fn host_crate() -> (proc_macro2::TokenStream, String) {
    match crate_name("travel-concierge") {
        Ok(FoundCrate::Itself) => (quote!(crate), "crate".to_string()),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            (quote!(::#ident), format!("::{}", name))
        }
        Err(_) => (quote!(::travel_concierge), "::travel_concierge".to_string()),
    }
}

/// Turn a free function into a `Tool` the agent can call.
///
/// ```ignore
/// #[tool(
///     name = "get_weather",
///     description = "Get weather for a given city",
///     params(city = "City name, e.g. 'New York'")
/// )]
/// fn get_weather(city: String) -> ToolReport { .. }
/// ```
///
/// Generates `GetWeatherParams` (the deserialized arguments) and the unit
/// struct `GetWeatherTool`. The function's return value is serialized to JSON
/// and becomes the tool result.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    let mut name_override = None;
    let mut description = None;
    let mut params_meta = Vec::<(String, String)>::new();

    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            let s: LitStr = meta.value()?.parse()?;
            name_override = Some(s.value());
            Ok(())
        } else if meta.path.is_ident("description") {
            let s: LitStr = meta.value()?.parse()?;
            description = Some(s.value());
            Ok(())
        } else if meta.path.is_ident("params") {
            meta.parse_nested_meta(|param| {
                let ident = param
                    .path
                    .get_ident()
                    .ok_or_else(|| param.error("expected a parameter name"))?
                    .to_string();
                let s: LitStr = param.value()?.parse()?;
                params_meta.push((ident, s.value()));
                Ok(())
            })
        } else {
            Err(meta.error("unsupported tool attribute, expected `name`, `description` or `params`"))
        }
    });
    parse_macro_input!(attr with attr_parser);

    let description = match description {
        Some(d) => d,
        None => {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                "tool requires `description = \"...\"`",
            )
            .to_compile_error()
            .into();
        }
    };

    let fn_ident = input_fn.sig.ident.clone();
    let fn_name = fn_ident.to_string();
    let tool_name = name_override.unwrap_or(fn_name.clone());

    let mut fields = Vec::new();
    let mut param_names = Vec::new();

    for arg in &input_fn.sig.inputs {
        match arg {
            FnArg::Typed(pt) => {
                if let Pat::Ident(pi) = &*pt.pat {
                    fields.push((pi.ident.clone(), (*pt.ty).clone()));
                    param_names.push(pi.ident.to_string());
                } else {
                    return syn::Error::new_spanned(
                        &pt.pat,
                        "only simple identifiers are supported",
                    )
                    .to_compile_error()
                    .into();
                }
            }
            FnArg::Receiver(_) => {
                return syn::Error::new_spanned(
                    arg,
                    "methods with self are not supported",
                )
                .to_compile_error()
                .into();
            }
        }
    }

    for (k, _) in &params_meta {
        if !param_names.contains(k) {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                format!("param '{}' not found in function signature", k),
            )
            .to_compile_error()
            .into();
        }
    }

    let params_struct_ident =
        syn::Ident::new(&format!("{}Params", pascal_case(&fn_name)), fn_ident.span());
    let tool_struct_ident =
        syn::Ident::new(&format!("{}Tool", pascal_case(&fn_name)), fn_ident.span());

    let (host, host_path) = host_crate();
    let serde_path = LitStr::new(&format!("{}::serde", host_path), fn_ident.span());

    let field_defs = fields.iter().map(|(id, ty)| {
        quote!(pub #id: #ty)
    });

    let args_entries = fields.iter().map(|(ident, ty)| {
        let desc = params_meta
            .iter()
            .find(|(k, _)| k == &ident.to_string())
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        if desc.is_empty() {
            return syn::Error::new_spanned(
                ident,
                format!("missing description for param '{}'", ident),
            )
            .to_compile_error();
        }

        let (arg_type, required) = match option_inner(ty) {
            Some(inner) => (infer_json_type(inner), false),
            None => (infer_json_type(ty), true),
        };
        let name_lit = LitStr::new(&ident.to_string(), ident.span());
        let desc_lit = LitStr::new(&desc, ident.span());

        quote! {
            #host::tools::traits::ArgSchema {
                name: #name_lit.into(),
                arg_type: #arg_type.into(),
                description: #desc_lit.into(),
                required: #required,
            }
        }
    });

    let call_args = fields.iter().map(|(id, _)| quote!(params.#id));
    let call = if input_fn.sig.asyncness.is_some() {
        quote!(#fn_ident(#(#call_args),*).await)
    } else {
        quote!(#fn_ident(#(#call_args),*))
    };

    let expanded = quote! {
        #input_fn

        #[derive(#host::serde::Deserialize)]
        #[serde(crate = #serde_path)]
        pub struct #params_struct_ident {
            #(#field_defs,)*
        }

        pub struct #tool_struct_ident;

        #[#host::async_trait::async_trait]
        impl #host::tools::traits::Tool for #tool_struct_ident {
            fn name(&self) -> &str { #tool_name }
            fn description(&self) -> &str { #description }
            fn args(&self) -> Vec<#host::tools::traits::ArgSchema> {
                vec![#(#args_entries),*]
            }
            async fn run(
                &self,
                _ctx: &#host::tools::ToolContext,
                input: #host::serde_json::Value,
            ) -> Result<#host::serde_json::Value, #host::tools::error::ToolError> {
                let params: #params_struct_ident =
                    #host::serde_json::from_value(input)
                        .map_err(|e| #host::tools::error::ToolError::ParamsNotMatched(e.to_string()))?;
                let output = #call;
                #host::serde_json::to_value(output).map_err(|e| {
                    #host::tools::error::ToolError::ExecutionError {
                        name: #tool_name.to_string(),
                        reason: e.to_string(),
                    }
                })
            }
        }
    };

    TokenStream::from(expanded)
}

fn pascal_case(s: &str) -> String {
    s.split('_')
        .map(|p| {
            let mut c = p.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

/// `Option<T>` parameters are optional in the schema.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else { return None };
    let last = p.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    match &last.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|a| match a {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

fn infer_json_type(ty: &Type) -> &'static str {
    match ty {
        Type::Path(p) => {
            let Some(last) = p.path.segments.last() else { return "object" };
            match last.ident.to_string().as_str() {
                "String" | "str" => "string",
                "bool" => "boolean",
                "i8" | "i16" | "i32" | "i64" |
                "u8" | "u16" | "u32" | "u64" |
                "usize" | "isize" => "integer",
                "f32" | "f64" => "number",
                "Vec" => "array",
                _ => "object",
            }
        }
        Type::Reference(r) => infer_json_type(&r.elem),
        _ => "object",
    }
}
