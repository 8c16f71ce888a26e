use std::collections::BTreeMap;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, Ident, LitInt, Pat, Result, Token, Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromRecord` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut field_cases: BTreeMap<u8, FieldMetadata> = BTreeMap::new();
    let mut time_case: Option<FieldMetadata> = None;

    for field in fields {
        let (span, number) = match &field.identifier {
            FieldIdentifier::Number(literal) => (literal.span(), Some(literal.base10_parse::<u8>()?)),
            FieldIdentifier::Time(ident) => (ident.span(), None),
        };

        let existing = match number {
            Some(number) => field_cases.insert(number, field).is_some(),
            None => time_case.replace(field).is_some(),
        };

        if existing {
            Err(Error::new(span, "Field identifiers must be unique."))?
        }
    }

    let field_method = (!field_cases.is_empty()).then(|| {
        let cases = field_cases.iter().map(|(number, field)| {
            let name = &field.name;

            let assignment = if let Some(handler) = &field.handler {
                let value_type = quote! { &::freewheel::avec::RecordField };
                let call = handler_call(&field.ty, handler, value_type);
                quote! { #call(&mut self.#name, field) }
            } else {
                quote! {
                    if let Some(value) = ::freewheel::avec::FromField::from_field(field) {
                        self.#name = Some(value);
                    }
                }
            };

            quote! { #number => { #assignment } }
        });

        quote! {
            fn add_field(&mut self, field: &::freewheel::avec::RecordField) {
                match field.field_number {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    });

    let time_method = time_case.map(|field| {
        let name = &field.name;

        let assignment = if let Some(handler) = &field.handler {
            let call = handler_call(&field.ty, handler, quote! { u8 });
            quote! { #call(&mut self.#name, offset) }
        } else {
            quote! { self.#name = Some(offset) }
        };

        quote! {
            fn add_time_offset(&mut self, offset: u8) {
                #assignment;
            }
        }
    });

    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::freewheel::avec::FromRecord for #name #type_generics #where_clause {
            #field_method
            #time_method
        }
    };

    Ok(expanded.into())
}

/// Wrap a handler closure, annotating any parameter left untyped.
fn handler_call(
    field_type: &Type,
    handler: &ExprClosure,
    value_type: impl ToTokens,
) -> impl ToTokens {
    let body = &handler.body;
    let acc = &handler.inputs[0];
    let val = &handler.inputs[1];

    let acc = match acc {
        Pat::Type(_) => quote! { #acc },
        _ => quote! { #acc: &mut #field_type },
    };

    let val = match val {
        Pat::Type(_) => quote! { #val },
        _ => quote! { #val: #value_type },
    };

    quote! { (|#acc, #val| #body) }
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    ty: Type,
    identifier: FieldIdentifier,
    handler: Option<ExprClosure>,
}

#[derive(Debug)]
enum FieldIdentifier {
    Number(LitInt),
    Time(Ident),
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let FieldAttribute {
            identifier,
            handler,
        } = attr.meta.require_list()?.parse_args()?;

        if let Some(handler) = &handler {
            if handler.inputs.len() != 2 {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            }
        } else {
            let Type::Path(path) = &field.ty else {
                Err(Error::new_spanned(
                    &field.ty,
                    "Field without a handler must have type `Option<T>`.",
                ))?
            };

            let is_option = path
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Option");

            if !is_option {
                Err(Error::new_spanned(
                    &path.path,
                    "Field without a handler must have type `Option<T>`.",
                ))?
            }
        }

        Ok(Some(Self {
            name,
            ty: field.ty.clone(),
            identifier,
            handler,
        }))
    }
}

#[derive(Debug)]
struct FieldAttribute {
    identifier: FieldIdentifier,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let identifier = if let Ok(ident) = input.parse::<Ident>() {
            if ident == "time" {
                FieldIdentifier::Time(ident)
            } else {
                Err(Error::new_spanned(
                    ident,
                    "Field identifier must be an integer literal or `time`.",
                ))?
            }
        } else {
            FieldIdentifier::Number(input.parse::<LitInt>()?)
        };

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self {
            identifier,
            handler,
        })
    }
}
