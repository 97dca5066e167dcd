//! Implementation of the `#[derive(Schema)]` macro.
//!
//! Parsing collects the struct's fields and `#[schema(...)]` attributes into
//! [`SchemaInput`]; code generation then emits the schema type, its `Schema`
//! implementation and the builder accessor trait.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, LitStr, Type, Visibility};

/// Main implementation of the Schema derive macro.
pub fn derive_schema_impl(input: &DeriveInput) -> TokenStream2 {
    match SchemaInput::parse(input) {
        Ok(parsed) => parsed.expand(),
        Err(error) => error.to_compile_error(),
    }
}

/// The struct being derived, reduced to what code generation needs.
struct SchemaInput<'a> {
    name: &'a Ident,
    visibility: &'a Visibility,
    struct_default: bool,
    fields: Vec<FieldInput<'a>>,
}

/// One named field and its `#[schema(...)]` options.
struct FieldInput<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    key: String,
    default: Option<Expr>,
}

impl<'a> SchemaInput<'a> {
    fn parse(input: &'a DeriveInput) -> syn::Result<Self> {
        let name = &input.ident;

        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "Schema cannot be derived for generic structs.",
            ));
        }

        let named = match &input.data {
            Data::Struct(data_struct) => match &data_struct.fields {
                Fields::Named(named) => &named.named,
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new_spanned(
                        name,
                        "Schema can only be derived for structs with named fields, not tuple structs.",
                    ));
                }
                Fields::Unit => {
                    return Err(syn::Error::new_spanned(
                        name,
                        "Schema cannot be derived for unit structs (structs with no fields).",
                    ));
                }
            },
            Data::Enum(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Schema can only be derived for structs, not enums.",
                ));
            }
            Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Schema cannot be derived for unions.",
                ));
            }
        };

        let struct_default = parse_struct_attributes(&input.attrs)?;
        let fields = named
            .iter()
            .map(|field| {
                let ident = field
                    .ident
                    .as_ref()
                    .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
                let (rename, default) = parse_field_attributes(&field.attrs)?;
                Ok(FieldInput {
                    ident,
                    ty: &field.ty,
                    key: rename.unwrap_or_else(|| ident.unraw().to_string()),
                    default,
                })
            })
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self {
            name,
            visibility: &input.vis,
            struct_default,
            fields,
        })
    }

    fn expand(&self) -> TokenStream2 {
        let name = self.name;
        let visibility = self.visibility;
        let schema_name = format_ident!("{}Schema", name);
        let fields_trait = format_ident!("{}Fields", name);
        let display_name = name.unraw().to_string();

        let keys: Vec<&str> = self.fields.iter().map(|field| field.key.as_str()).collect();
        let decode = self.expand_decode();
        let field_default = self.expand_field_default();
        let struct_default = self.expand_struct_default();
        let accessors = self.expand_accessors(&fields_trait, &schema_name);

        let schema_doc = format!("Schema for [`{display_name}`], generated by `#[derive(Schema)]`.");

        quote! {
            #[doc = #schema_doc]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            #visibility struct #schema_name;

            impl ::lenscraft::schema::Schema for #schema_name {
                type Output = #name;

                fn name(&self) -> &str {
                    #display_name
                }

                fn fields(&self) -> ::std::vec::Vec<&str> {
                    ::std::vec![#(#keys),*]
                }

                #decode

                #field_default

                #struct_default
            }

            #accessors
        }
    }

    fn expand_decode(&self) -> TokenStream2 {
        let name = self.name;
        let locals: Vec<Ident> = self
            .fields
            .iter()
            .map(|field| format_ident!("__field_{}", field.ident.unraw()))
            .collect();
        let idents = self.fields.iter().map(|field| field.ident);
        let decodes = self.fields.iter().zip(&locals).map(|(field, local)| {
            let ty = field.ty;
            let key = &field.key;
            quote! {
                let #local = __decoder.field::<#ty>(#key);
            }
        });

        quote! {
            fn decode(
                &self,
                __state: &::lenscraft::state::PartialState,
            ) -> ::core::result::Result<#name, ::lenscraft::schema::SchemaFailure> {
                let mut __decoder = ::lenscraft::schema::Decoder::new(__state);
                #(#decodes)*
                match (#(#locals,)*) {
                    (#(::core::option::Option::Some(#locals),)*) => {
                        ::core::result::Result::Ok(#name { #(#idents: #locals),* })
                    }
                    _ => ::core::result::Result::Err(__decoder.into_failure()),
                }
            }
        }
    }

    fn expand_field_default(&self) -> TokenStream2 {
        let arms: Vec<TokenStream2> = self
            .fields
            .iter()
            .filter_map(|field| {
                let expr = field.default.as_ref()?;
                let ty = field.ty;
                let key = &field.key;
                Some(quote! {
                    #key => {
                        let __value: #ty = ::core::convert::Into::into(#expr);
                        ::lenscraft::defaults::field_default_value(
                            ::lenscraft::schema::Schema::name(self),
                            #key,
                            &__value,
                        )
                    }
                })
            })
            .collect();

        if arms.is_empty() {
            return TokenStream2::new();
        }

        quote! {
            fn field_default(&self, __key: &str) -> ::core::option::Option<::lenscraft::state::Value> {
                match __key {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }

    fn expand_struct_default(&self) -> TokenStream2 {
        if !self.struct_default {
            return TokenStream2::new();
        }
        let name = self.name;
        quote! {
            fn struct_default(&self) -> ::core::option::Option<::lenscraft::state::PartialState> {
                ::lenscraft::defaults::struct_default_state(
                    ::lenscraft::schema::Schema::name(self),
                    &<#name as ::core::default::Default>::default(),
                )
            }
        }
    }

    fn expand_accessors(&self, fields_trait: &Ident, schema_name: &Ident) -> TokenStream2 {
        let visibility = self.visibility;
        let mut trait_doc = format!(
            "Named field accessors for builders of [`{}`], generated by `#[derive(Schema)]`.",
            self.name.unraw()
        );
        let shadowed: Vec<String> = self
            .fields
            .iter()
            .map(|field| field.ident.unraw().to_string())
            .filter(|ident| BUILDER_METHODS.contains(&ident.as_str()))
            .collect();
        if !shadowed.is_empty() {
            trait_doc.push_str(&format!(
                "\n\nThe lenses for {} share a name with a `Builder` method; call them as `{}::{}(&builder)`.",
                shadowed
                    .iter()
                    .map(|ident| format!("`{ident}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
                fields_trait,
                shadowed[0],
            ));
        }

        let mut declarations = Vec::with_capacity(self.fields.len());
        let mut implementations = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let ident = field.ident;
            let ty = field.ty;
            let key = &field.key;
            let setter = format_ident!("set_{}", ident.unraw());
            let lens_doc = format!("Returns a lens focused on the `{key}` field.");
            let setter_doc = format!("Returns a transform binding the `{key}` field to `value`.");

            declarations.push(quote! {
                #[doc = #lens_doc]
                fn #ident(&self) -> ::lenscraft::lens::Lens<#ty>;

                #[doc = #setter_doc]
                fn #setter(&self, value: #ty) -> ::lenscraft::lens::SetField;
            });
            implementations.push(quote! {
                fn #ident(&self) -> ::lenscraft::lens::Lens<#ty> {
                    self.field::<#ty>(#key)
                }

                fn #setter(&self, value: #ty) -> ::lenscraft::lens::SetField {
                    self.field::<#ty>(#key).set(value)
                }
            });
        }

        quote! {
            #[doc = #trait_doc]
            #visibility trait #fields_trait {
                #(#declarations)*
            }

            impl #fields_trait for ::lenscraft::builder::Builder<#schema_name> {
                #(#implementations)*
            }
        }
    }
}

/// Inherent `Builder` methods; a field accessor with one of these names is
/// only reachable through its trait.
const BUILDER_METHODS: [&str; 8] = [
    "schema",
    "defaults",
    "field",
    "when",
    "when_else",
    "compose",
    "preview",
    "build",
];

/// Parses `#[schema(default)]` on the struct.
fn parse_struct_attributes(attributes: &[Attribute]) -> syn::Result<bool> {
    let mut struct_default = false;
    for attribute in attributes.iter().filter(|attribute| attribute.path().is_ident("schema")) {
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                if !meta.input.is_empty() && !meta.input.peek(syn::Token![,]) {
                    return Err(meta.error(
                        "struct-level `default` takes no value; it uses `Default::default()`",
                    ));
                }
                struct_default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported schema attribute; expected `default`"))
            }
        })?;
    }
    Ok(struct_default)
}

/// Parses `#[schema(rename = "...", default = expr)]` on a field.
fn parse_field_attributes(attributes: &[Attribute]) -> syn::Result<(Option<String>, Option<Expr>)> {
    let mut rename = None;
    let mut default = None;
    for attribute in attributes.iter().filter(|attribute| attribute.path().is_ident("schema")) {
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = Some(meta.value()?.parse::<Expr>()?);
                Ok(())
            } else if meta.path.is_ident("rename") {
                rename = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else {
                Err(meta.error("unsupported schema attribute; expected `default` or `rename`"))
            }
        })?;
    }
    Ok((rename, default))
}
