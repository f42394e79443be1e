use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, FnArg, ItemFn, LitStr, Pat, ReturnType};

/// Record a `squall_instruments::OperationRecord` around an async method.
///
/// The method must be `async`, take `&self`, return a `Result` and live on a type with a
/// `reporter: Arc<Reporter>` field. The operation is named after the method, optionally with a
/// prefix: `#[squall_instrument(prefix = "http_")]` on `get` records `http_get`.
///
/// `pre_hook = some_fn` calls `some_fn(&mut operation_record, &arg1, &arg2, ..)` with references
/// to the method's arguments before the body runs, so attributes can be attached to the record.
#[proc_macro_attribute]
pub fn squall_instrument(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut prefix = String::new();
    let mut pre_hook: Option<syn::Path> = None;
    let args_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("prefix") {
            let value: LitStr = meta.value()?.parse()?;
            prefix = value.value();
            Ok(())
        } else if meta.path.is_ident("pre_hook") {
            pre_hook = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported squall_instrument property"))
        }
    });
    parse_macro_input!(args with args_parser);

    let mut input = parse_macro_input!(input as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(&input.sig, "squall_instrument requires an async fn")
            .to_compile_error()
            .into();
    }

    let output_ty = match &input.sig.output {
        ReturnType::Type(_, ty) => ty.clone(),
        ReturnType::Default => {
            return syn::Error::new_spanned(
                &input.sig,
                "squall_instrument requires a fn that returns a Result",
            )
            .to_compile_error()
            .into();
        }
    };

    let mut arg_names = Vec::new();
    for arg in &input.sig.inputs {
        if let FnArg::Typed(pat_type) = arg {
            match pat_type.pat.as_ref() {
                Pat::Ident(pat_ident) => arg_names.push(pat_ident.ident.clone()),
                other => {
                    return syn::Error::new_spanned(
                        other,
                        "squall_instrument requires plain argument names",
                    )
                    .to_compile_error()
                    .into();
                }
            }
        }
    }

    let operation_id = format!("{}{}", prefix, input.sig.ident);
    let body = input.block.clone();
    let call_pre_hook = pre_hook.map(|pre_hook| {
        quote! {
            #pre_hook(&mut operation_record, #(&#arg_names),*);
        }
    });

    input.block = parse_quote!({
        #[allow(unused_mut)]
        let mut operation_record = ::squall_instruments::OperationRecord::new(#operation_id.to_string());
        #call_pre_hook
        let response: #output_ty = async { #body }.await;
        ::squall_instruments::report_operation(self.reporter.clone(), operation_record, &response);
        response
    });

    TokenStream::from(quote!(#input))
}
