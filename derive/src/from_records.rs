use std::collections::BTreeMap;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Error, Field, Fields, Ident, LitInt, Result, Type};

pub(crate) fn expand_from_records(input: &DeriveInput) -> Result<TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => Err(Error::new_spanned(
                input,
                "`FromRecords` may only be derived on structs with named fields.",
            ))?,
        },
        _ => Err(Error::new_spanned(
            input,
            "`FromRecords` may only be derived on structs.",
        ))?,
    };

    // Keyed by global message number, rejecting repeats.
    let mut receivers = BTreeMap::new();

    for field in fields {
        let Some((literal, receiver)) = Receiver::parse(field)? else {
            continue;
        };

        let message = literal.base10_parse::<u16>()?;
        if receivers.insert(message, receiver).is_some() {
            Err(Error::new_spanned(
                &literal,
                "Record identifiers must be unique.",
            ))?
        }
    }

    let arms = receivers.iter().map(|(message, receiver)| {
        let add = receiver.add();
        quote! { #message => #add, }
    });

    let name = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::freewheel::avec::FromRecords for #name #type_generics #where_clause {
            fn add_record(&mut self, id: u16) -> Option<&mut dyn ::freewheel::avec::FromRecord> {
                match id {
                    #(#arms)*
                    _ => None,
                }
            }
        }
    }
    .into())
}

/// How a struct field holds the records it receives.
enum Collection {
    /// The latest record replaces any earlier one.
    Latest,
    /// Every record is appended.
    All,
}

struct Receiver {
    field: Ident,
    collection: Collection,
}

impl Receiver {
    /// Read the `record(N)` attribute of a struct field, if it has one.
    fn parse(field: &Field) -> Result<Option<(LitInt, Self)>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("record")) else {
            return Ok(None);
        };

        let Some(ident) = &field.ident else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let literal = attr.parse_args::<LitInt>()?;

        let receiver = Self {
            field: ident.clone(),
            collection: collection_of(&field.ty)?,
        };

        Ok(Some((literal, receiver)))
    }

    /// An expression inserting a default record and lending it out.
    fn add(&self) -> impl ToTokens {
        let field = &self.field;
        let record = quote! { ::core::default::Default::default() };

        match self.collection {
            Collection::Latest => quote! {
                Some(self.#field.insert(#record))
            },
            Collection::All => quote! {{
                self.#field.push(#record);
                self.#field
                    .last_mut()
                    .map(|r| r as &mut dyn ::freewheel::avec::FromRecord)
            }},
        }
    }
}

fn collection_of(ty: &Type) -> Result<Collection> {
    let outer = match ty {
        Type::Path(path) => path.path.segments.last().map(|s| &s.ident),
        _ => None,
    };

    match outer {
        Some(ident) if ident == "Option" => Ok(Collection::Latest),
        Some(ident) if ident == "Vec" => Ok(Collection::All),
        _ => Err(Error::new_spanned(
            ty,
            "Field must have an `Option<T>` or `Vec<T>` type.",
        )),
    }
}
