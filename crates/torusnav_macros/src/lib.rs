use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Time a function when the calling crate is built with `perf_stats`.
///
/// The body is wrapped in a drop guard that logs `[PERF] <fn name>: <elapsed>`
/// through Bevy's logger whenever a call takes at least the threshold. The
/// threshold is given in milliseconds and defaults to 1. Without the feature
/// the function is emitted untouched.
///
/// # Example
/// ```ignore
/// #[profile]
/// fn floyd_warshall(table: &mut DistanceTable) { /* ... */ }
///
/// #[profile(20)]
/// pub fn build_navmesh(/* ... */) -> Result<NavMesh, NavmeshError> { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        let literal = parse_macro_input!(attr as LitInt);
        match literal.base10_parse::<u128>() {
            Ok(value) => value,
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let ItemFn { attrs, vis, sig, block } = parse_macro_input!(item as ItemFn);
    let fn_name = sig.ident.to_string();

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct ProfileGuard {
                    name: &'static str,
                    start: ::std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() >= #threshold_ms {
                            ::bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name,
                    start: ::std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
