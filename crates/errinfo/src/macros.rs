/// Build an [`AnnotatedError`](crate::AnnotatedError) with the installed settings.
///
/// # Forms
///
/// ```ignore
/// // Identity only:
/// annotated!(ERR_BIND)
///
/// // With key/value context (values can be anything `Display`):
/// annotated!(ERR_BIND, "port" => port, "iface" => "eth0")
///
/// // With an explicit capture level after `;`:
/// annotated!(ERR_BIND, "port" => port; CaptureLevel::Full)
/// ```
#[macro_export]
macro_rules! annotated {
    ($identity:expr $(, $key:expr => $value:expr)* $(,)? $(; $level:expr)?) => {{
        #[allow(unused_mut)]
        let mut annotations: ::std::vec::Vec<$crate::Annotation> = ::std::vec::Vec::new();
        $( annotations.push($crate::Annotation::info($key, ($value).to_string())); )*
        $( annotations.push($crate::Annotation::Level($level)); )?
        $crate::AnnotatedError::new($identity, annotations)
    }};
}

/// Early-return an annotated error if a condition is false.
///
/// ```ignore
/// ensure!(port > 1024, ERR_PRIVILEGED, "port" => port);
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $identity:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if !$cond {
            return ::std::result::Result::Err($crate::annotated!($identity $(, $key => $value)*).into());
        }
    };
}
