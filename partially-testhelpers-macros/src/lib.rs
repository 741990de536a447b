use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    // attributes, visibility and qualifiers in front of `fn`
    struct Preamble {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    // generics and parameters between the name and the body
    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct Body {
        items: BraceGroup,
    }

    struct TestFn {
        preamble: Preamble, _fn: KFn, name: Ident,
        signature: Signature, body: Body
    }
}

impl quote::ToTokens for Preamble {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Signature {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Body {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        tokens.extend(self.items.0.stream())
    }
}

/// Turns a test function into one returning `eyre::Result<()>`, with the
/// shared logger and error hooks installed before the body runs.
#[proc_macro_attribute]
pub fn test(
    _attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let mut iter = item.to_token_iter();
    let Ok(test_fn) = iter.parse::<TestFn>() else {
        return quote::quote! {
            ::core::compile_error!("#[partially_testhelpers::test] expects a function item");
        }
        .into();
    };

    let TestFn {
        preamble,
        _fn,
        name,
        signature,
        body,
    } = test_fn;
    let test_name = name.to_string();

    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #preamble fn #name #signature -> ::partially_testhelpers::eyre::Result<()> {
            ::partially_testhelpers::setup_for(#test_name);

            #body

            Ok(())
        }
    }
    .into()
}
