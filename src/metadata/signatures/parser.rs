use crate::{
    file::parser::Parser,
    metadata::signatures::{
        ArrayDimensions, CustomModifier, SignatureArray, SignatureField, SignatureMethod,
        SignatureMethodSpec, SignatureParameter, SignaturePointer, SignatureProperty,
        SignatureSzArray, SignatureTypeSpec, TypeSignature, ELEMENT_TYPE, SIGNATURE_HEADER,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting depth of a type signature
pub const MAX_RECURSION_DEPTH: usize = 50;

/// Recursive-descent parser for signature blobs (II.23.2).
///
/// Each production is selected by a single leading byte; there is no backtracking. A parser
/// instance is meant for one blob: the `read_*` free functions of the parent module wrap it
/// and additionally reject blobs that are not consumed exactly.
///
/// # Example
///
/// ```rust
/// use dotmeta::metadata::signatures::{SignatureParser, TypeSignature};
///
/// // instance method, 1 parameter, returns void, takes string
/// let mut parser = SignatureParser::new(&[0x20, 0x01, 0x01, 0x0E]);
/// let method = parser.parse_method_signature()?;
/// assert!(method.has_this);
/// assert_eq!(method.params[0].base, TypeSignature::String);
/// # Ok::<(), dotmeta::Error>(())
/// ```
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Create a parser over one signature blob.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.parser.remaining()
    }

    /// Fail unless every byte of the blob was consumed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if trailing bytes remain.
    pub fn finish(&self) -> Result<()> {
        if self.parser.has_more_data() {
            return Err(malformed_error!(
                "Signature has {} trailing bytes at offset {}",
                self.parser.remaining(),
                self.parser.pos()
            ));
        }

        Ok(())
    }

    /// Parse a single `Type` production.
    ///
    /// # Errors
    /// Returns an error for unknown element types, truncated data, or nesting deeper than
    /// [`MAX_RECURSION_DEPTH`].
    pub fn parse_type(&mut self) -> Result<TypeSignature> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeSignature> {
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            ELEMENT_TYPE::VOID => Ok(TypeSignature::Void),
            ELEMENT_TYPE::BOOLEAN => Ok(TypeSignature::Boolean),
            ELEMENT_TYPE::CHAR => Ok(TypeSignature::Char),
            ELEMENT_TYPE::I1 => Ok(TypeSignature::I1),
            ELEMENT_TYPE::U1 => Ok(TypeSignature::U1),
            ELEMENT_TYPE::I2 => Ok(TypeSignature::I2),
            ELEMENT_TYPE::U2 => Ok(TypeSignature::U2),
            ELEMENT_TYPE::I4 => Ok(TypeSignature::I4),
            ELEMENT_TYPE::U4 => Ok(TypeSignature::U4),
            ELEMENT_TYPE::I8 => Ok(TypeSignature::I8),
            ELEMENT_TYPE::U8 => Ok(TypeSignature::U8),
            ELEMENT_TYPE::R4 => Ok(TypeSignature::R4),
            ELEMENT_TYPE::R8 => Ok(TypeSignature::R8),
            ELEMENT_TYPE::STRING => Ok(TypeSignature::String),
            ELEMENT_TYPE::OBJECT => Ok(TypeSignature::Object),
            ELEMENT_TYPE::I => Ok(TypeSignature::I),
            ELEMENT_TYPE::U => Ok(TypeSignature::U),
            ELEMENT_TYPE::TYPEDBYREF => Ok(TypeSignature::TypedByRef),
            ELEMENT_TYPE::PTR => Ok(TypeSignature::Ptr(SignaturePointer {
                modifiers: self.parse_custom_mods()?,
                base: Box::new(self.parse_type()?),
            })),
            ELEMENT_TYPE::BYREF => Ok(TypeSignature::ByRef(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSignature::ValueType(
                self.parser.read_compressed_token()?,
            )),
            ELEMENT_TYPE::CLASS => Ok(TypeSignature::Class(self.parser.read_compressed_token()?)),
            ELEMENT_TYPE::VAR => Ok(TypeSignature::GenericParamType(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::MVAR => Ok(TypeSignature::GenericParamMethod(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::ARRAY => self.parse_array(),
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not CLASS or VALUETYPE - 0x{:02X}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type()?;
                let arg_count = self.read_count("GENERICINST argument")?;
                if arg_count == 0 {
                    return Err(malformed_error!("GENERICINST without arguments"));
                }

                let mut type_args = Vec::with_capacity(arg_count);
                for _ in 0..arg_count {
                    type_args.push(self.parse_type()?);
                }

                Ok(TypeSignature::GenericInst(Box::new(base_type), type_args))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeSignature::FnPtr(Box::new(
                self.parse_method_signature()?,
            ))),
            ELEMENT_TYPE::SZARRAY => Ok(TypeSignature::SzArray(SignatureSzArray {
                modifiers: self.parse_custom_mods()?,
                base: Box::new(self.parse_type()?),
            })),
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                // Put the tag back, the modifier list reader consumes it
                self.parser.seek(self.parser.pos() - 1)?;
                let modifiers = self.parse_custom_mods()?;
                Ok(TypeSignature::Modified(
                    modifiers,
                    Box::new(self.parse_type()?),
                ))
            }
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - 0x{:02X} at offset {}",
                current_byte,
                self.parser.pos() - 1
            )),
        }
    }

    fn parse_array(&mut self) -> Result<TypeSignature> {
        let elem_type = self.parse_type()?;
        let rank = self.parser.read_compressed_uint()?;
        if rank == 0 {
            return Err(malformed_error!("ARRAY with rank 0"));
        }

        let num_sizes = self.read_count("ARRAY size")?;
        if num_sizes > rank as usize {
            return Err(malformed_error!(
                "ARRAY of rank {} declares {} sizes",
                rank,
                num_sizes
            ));
        }

        let mut dimensions = Vec::with_capacity(num_sizes);
        for _ in 0..num_sizes {
            dimensions.push(ArrayDimensions {
                size: Some(self.parser.read_compressed_uint()?),
                lower_bound: None,
            });
        }

        let num_lo_bounds = self.read_count("ARRAY lower bound")?;
        if num_lo_bounds > rank as usize {
            return Err(malformed_error!(
                "ARRAY of rank {} declares {} lower bounds",
                rank,
                num_lo_bounds
            ));
        }

        for index in 0..num_lo_bounds {
            let lower_bound = Some(self.parser.read_compressed_int()?);
            match dimensions.get_mut(index) {
                Some(dimension) => dimension.lower_bound = lower_bound,
                None => dimensions.push(ArrayDimensions {
                    size: None,
                    lower_bound,
                }),
            }
        }

        Ok(TypeSignature::Array(SignatureArray {
            base: Box::new(elem_type),
            rank,
            dimensions,
        }))
    }

    /// A count that is followed by at least one byte per element.
    fn read_count(&mut self, what: &str) -> Result<usize> {
        let count = self.parser.read_compressed_uint()? as usize;
        if count > self.parser.remaining() {
            return Err(malformed_error!(
                "{} count {} exceeds the {} remaining bytes",
                what,
                count,
                self.parser.remaining()
            ));
        }

        Ok(count)
    }

    /// Parse custom modifiers (`CMOD_OPT` or `CMOD_REQD`)
    fn parse_custom_mods(&mut self) -> Result<Vec<CustomModifier>> {
        let mut mods = Vec::new();

        while self.parser.has_more_data() {
            let is_required = match self.parser.peek_byte()? {
                ELEMENT_TYPE::CMOD_REQD => true,
                ELEMENT_TYPE::CMOD_OPT => false,
                _ => break,
            };

            self.parser.advance()?;
            mods.push(CustomModifier {
                is_required,
                modifier_type: self.parser.read_compressed_token()?,
            });
        }

        Ok(mods)
    }

    /// Parse a parameter including custom modifiers (`return_type` counts as parameter)
    fn parse_param(&mut self) -> Result<SignatureParameter> {
        let modifiers = self.parse_custom_mods()?;
        let by_ref = self.parser.consume_if(ELEMENT_TYPE::BYREF);

        Ok(SignatureParameter {
            modifiers,
            by_ref,
            base: self.parse_type()?,
        })
    }

    /// Parse a `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`.
    ///
    /// # Errors
    /// Returns an error for an invalid calling convention, truncated data or a `SENTINEL` in a
    /// non-vararg signature.
    pub fn parse_method_signature(&mut self) -> Result<SignatureMethod> {
        let convention_byte = self.parser.read_le::<u8>()?;
        let calling_convention = convention_byte & SIGNATURE_HEADER::KIND_MASK;
        if calling_convention > SIGNATURE_HEADER::VARARG {
            return Err(malformed_error!(
                "Invalid method calling convention - 0x{:02X}",
                convention_byte
            ));
        }

        let generic_param_count = if convention_byte & SIGNATURE_HEADER::GENERIC != 0 {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.read_count("Parameter")?;
        let mut method = SignatureMethod {
            has_this: convention_byte & SIGNATURE_HEADER::HAS_THIS != 0,
            explicit_this: convention_byte & SIGNATURE_HEADER::EXPLICIT_THIS != 0,
            calling_convention,
            generic_param_count,
            return_type: self.parse_param()?,
            params: Vec::with_capacity(param_count),
            varargs: Vec::new(),
        };

        for _ in 0..param_count {
            if self.parser.consume_if(ELEMENT_TYPE::SENTINEL) {
                if !method.is_vararg() || !method.varargs.is_empty() {
                    return Err(malformed_error!("Unexpected SENTINEL in method signature"));
                }

                // The sentinel precedes a parameter, it is not counted as one
                method.varargs.push(self.parse_param()?);
                continue;
            }

            if method.varargs.is_empty() {
                method.params.push(self.parse_param()?);
            } else {
                method.varargs.push(self.parse_param()?);
            }
        }

        Ok(method)
    }

    /// Parse a `FieldSig`.
    ///
    /// # Errors
    /// Returns an error if the header is not `FIELD` or the field type is invalid.
    pub fn parse_field_signature(&mut self) -> Result<SignatureField> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::FIELD {
            return Err(malformed_error!(
                "SignatureField - invalid start - 0x{:02X}",
                head_byte
            ));
        }

        Ok(SignatureField {
            modifiers: self.parse_custom_mods()?,
            base: self.parse_type()?,
        })
    }

    /// Parse a `PropertySig`.
    ///
    /// # Errors
    /// Returns an error if the header is not `PROPERTY` (optionally with `HASTHIS`) or the
    /// types are invalid.
    pub fn parse_property_signature(&mut self) -> Result<SignatureProperty> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte & !SIGNATURE_HEADER::HAS_THIS != SIGNATURE_HEADER::PROPERTY {
            return Err(malformed_error!(
                "SignatureProperty - invalid start - 0x{:02X}",
                head_byte
            ));
        }

        let param_count = self.read_count("Property parameter")?;
        let modifiers = self.parse_custom_mods()?;
        let base = self.parse_type()?;

        let mut params = Vec::with_capacity(param_count);
        for _ in 0..param_count {
            params.push(self.parse_param()?);
        }

        Ok(SignatureProperty {
            has_this: head_byte & SIGNATURE_HEADER::HAS_THIS != 0,
            modifiers,
            base,
            params,
        })
    }

    /// Parse a `TypeSpec` blob.
    ///
    /// # Errors
    /// Returns an error if the type is invalid.
    pub fn parse_type_spec_signature(&mut self) -> Result<SignatureTypeSpec> {
        Ok(SignatureTypeSpec {
            base: self.parse_type()?,
        })
    }

    /// Parse a `MethodSpec` blob.
    ///
    /// # Errors
    /// Returns an error if the header is not `GENERICINST` or an argument is invalid.
    pub fn parse_method_spec_signature(&mut self) -> Result<SignatureMethodSpec> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::GENERICINST {
            return Err(malformed_error!(
                "SignatureMethodSpec - invalid start - 0x{:02X}",
                head_byte
            ));
        }

        let arg_count = self.read_count("MethodSpec argument")?;
        let mut generic_args = Vec::with_capacity(arg_count);
        for _ in 0..arg_count {
            generic_args.push(self.parse_type()?);
        }

        Ok(SignatureMethodSpec { generic_args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::Token;

    #[test]
    fn primitive_types() {
        let test_cases = [
            (vec![0x01], TypeSignature::Void),
            (vec![0x02], TypeSignature::Boolean),
            (vec![0x03], TypeSignature::Char),
            (vec![0x04], TypeSignature::I1),
            (vec![0x05], TypeSignature::U1),
            (vec![0x06], TypeSignature::I2),
            (vec![0x07], TypeSignature::U2),
            (vec![0x08], TypeSignature::I4),
            (vec![0x09], TypeSignature::U4),
            (vec![0x0A], TypeSignature::I8),
            (vec![0x0B], TypeSignature::U8),
            (vec![0x0C], TypeSignature::R4),
            (vec![0x0D], TypeSignature::R8),
            (vec![0x0E], TypeSignature::String),
            (vec![0x1C], TypeSignature::Object),
            (vec![0x18], TypeSignature::I),
            (vec![0x19], TypeSignature::U),
            (vec![0x16], TypeSignature::TypedByRef),
        ];

        for (bytes, expected_type) in test_cases {
            let mut parser = SignatureParser::new(&bytes);
            assert_eq!(parser.parse_type().unwrap(), expected_type);
            assert!(parser.finish().is_ok());
        }
    }

    #[test]
    fn class_and_valuetype() {
        // TypeSpec row 0x10
        let mut parser = SignatureParser::new(&[0x12, 0x42]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::Class(Token::new(0x1B00_0010))
        );

        // TypeRef row 0xD
        let mut parser = SignatureParser::new(&[0x11, 0x35]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::ValueType(Token::new(0x0100_000D))
        );

        let mut parser = SignatureParser::new(&[0x13, 0x03]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::GenericParamType(3)
        );

        let mut parser = SignatureParser::new(&[0x1E, 0x81, 0x00]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::GenericParamMethod(0x100)
        );
    }

    #[test]
    fn arrays() {
        let mut parser = SignatureParser::new(&[0x1D, 0x08]);
        let TypeSignature::SzArray(array) = parser.parse_type().unwrap() else {
            panic!("expected SZARRAY");
        };
        assert_eq!(*array.base, TypeSignature::I4);

        // int[,]
        let mut parser = SignatureParser::new(&[0x14, 0x08, 0x02, 0x00, 0x00]);
        let TypeSignature::Array(array) = parser.parse_type().unwrap() else {
            panic!("expected ARRAY");
        };
        assert_eq!(array.rank, 2);
        assert!(array.dimensions.is_empty());

        // int[-1...1, 3] - one lower bound of -1, sizes 3 and 3
        #[rustfmt::skip]
        let mut parser = SignatureParser::new(&[
            0x14, 0x08, // ARRAY I4
            0x02,       // rank
            0x02, 0x03, 0x03, // sizes
            0x01, 0x7F, // lower bounds: -1
        ]);
        let TypeSignature::Array(array) = parser.parse_type().unwrap() else {
            panic!("expected ARRAY");
        };
        assert_eq!(array.dimensions.len(), 2);
        assert_eq!(array.dimensions[0].size, Some(3));
        assert_eq!(array.dimensions[0].lower_bound, Some(-1));
        assert_eq!(array.dimensions[1].lower_bound, None);
        assert!(parser.finish().is_ok());

        // more sizes than dimensions
        let mut parser = SignatureParser::new(&[0x14, 0x08, 0x01, 0x02, 0x01, 0x01, 0x00]);
        assert!(parser.parse_type().is_err());

        let mut parser = SignatureParser::new(&[0x14, 0x08, 0x00, 0x00, 0x00]);
        assert!(parser.parse_type().is_err());
    }

    #[test]
    fn pointers_and_byrefs() {
        let mut parser = SignatureParser::new(&[0x0F, 0x08]);
        let TypeSignature::Ptr(pointer) = parser.parse_type().unwrap() else {
            panic!("expected PTR");
        };
        assert_eq!(*pointer.base, TypeSignature::I4);

        let mut parser = SignatureParser::new(&[0x10, 0x08]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::ByRef(Box::new(TypeSignature::I4))
        );
    }

    #[test]
    fn generic_instance() {
        // Dictionary<string, int>
        let mut parser = SignatureParser::new(&[0x15, 0x12, 0x2A, 0x02, 0x0E, 0x08]);
        let TypeSignature::GenericInst(class, args) = parser.parse_type().unwrap() else {
            panic!("expected GENERICINST");
        };
        assert_eq!(*class, TypeSignature::Class(Token::new(0x1B00_000A)));
        assert_eq!(args, vec![TypeSignature::String, TypeSignature::I4]);

        // base must be CLASS or VALUETYPE
        let mut parser = SignatureParser::new(&[0x15, 0x08, 0x01, 0x08]);
        assert!(parser.parse_type().is_err());

        // no arguments
        let mut parser = SignatureParser::new(&[0x15, 0x12, 0x2A, 0x00]);
        assert!(parser.parse_type().is_err());
    }

    #[test]
    fn custom_mods() {
        let mut parser = SignatureParser::new(&[
            0x20, 0x42, // CMOD_OPT, TypeSpec 0x10
            0x1F, 0x49, // CMOD_REQD, TypeRef 0x12
            0x08,
        ]);

        let mods = parser.parse_custom_mods().unwrap();
        assert_eq!(
            mods,
            vec![
                CustomModifier {
                    is_required: false,
                    modifier_type: Token::new(0x1B00_0010)
                },
                CustomModifier {
                    is_required: true,
                    modifier_type: Token::new(0x0100_0012)
                },
            ]
        );
        assert_eq!(parser.parse_type().unwrap(), TypeSignature::I4);

        // modifiers in a bare type position
        let mut parser = SignatureParser::new(&[0x1F, 0x49, 0x08]);
        let modified = parser.parse_type().unwrap();
        assert!(matches!(modified, TypeSignature::Modified(ref mods, _) if mods.len() == 1));
        assert_eq!(modified.unmodified(), &TypeSignature::I4);
    }

    #[test]
    fn method_signature() {
        // Dictionary<List<int>, string[]> Method<T>(ref T arg1, List<int>[] arg2)
        #[rustfmt::skip]
        let mut parser = SignatureParser::new(&[
            0x30, // HASTHIS | GENERIC
            0x01, // 1 generic parameter
            0x02, // 2 parameters
            0x15, 0x12, 0x2A, 0x02, // Dictionary<
            0x15, 0x12, 0x49, 0x01, 0x08, // List<int>,
            0x1D, 0x0E, // string[]>
            0x10, 0x1E, 0x00, // ref !!0
            0x1D, 0x15, 0x12, 0x42, 0x01, 0x08, // List<int>[]
        ]);

        let method = parser.parse_method_signature().unwrap();
        assert!(parser.finish().is_ok());
        assert!(method.has_this);
        assert!(method.is_generic());
        assert_eq!(method.generic_param_count, 1);
        assert_eq!(method.params.len(), 2);
        assert!(matches!(
            method.return_type.base,
            TypeSignature::GenericInst(_, _)
        ));
        assert!(method.params[0].by_ref);
        assert_eq!(method.params[0].base, TypeSignature::GenericParamMethod(0));
        assert!(matches!(method.params[1].base, TypeSignature::SzArray(_)));
    }

    #[test]
    fn vararg_signature() {
        // vararg void M(int, ..., string)
        let mut parser = SignatureParser::new(&[0x05, 0x02, 0x01, 0x08, 0x41, 0x0E]);
        let method = parser.parse_method_signature().unwrap();
        assert!(method.is_vararg());
        assert_eq!(method.params.len(), 1);
        assert_eq!(method.varargs.len(), 1);
        assert_eq!(method.varargs[0].base, TypeSignature::String);

        // SENTINEL in a default signature
        let mut parser = SignatureParser::new(&[0x00, 0x02, 0x01, 0x08, 0x41, 0x0E]);
        assert!(parser.parse_method_signature().is_err());
    }

    #[test]
    fn property_signature() {
        // instance int this[string]
        let mut parser = SignatureParser::new(&[0x28, 0x01, 0x08, 0x0E]);
        let property = parser.parse_property_signature().unwrap();
        assert!(property.has_this);
        assert_eq!(property.base, TypeSignature::I4);
        assert_eq!(property.params.len(), 1);

        let mut parser = SignatureParser::new(&[0x06, 0x00, 0x08]);
        assert!(parser.parse_property_signature().is_err());
    }

    #[test]
    fn method_spec_signature() {
        let mut parser = SignatureParser::new(&[0x0A, 0x02, 0x08, 0x0E]);
        let spec = parser.parse_method_spec_signature().unwrap();
        assert_eq!(spec.generic_args, vec![TypeSignature::I4, TypeSignature::String]);
    }

    #[test]
    fn errors() {
        // reserved calling convention
        let mut parser = SignatureParser::new(&[0x0F, 0x00, 0x01]);
        assert!(parser.parse_method_signature().is_err());

        // truncated parameter list
        let mut parser = SignatureParser::new(&[0x00, 0x02, 0x01, 0x08]);
        assert!(parser.parse_method_signature().is_err());

        let mut parser = SignatureParser::new(&[0x07, 0x08]);
        assert!(parser.parse_field_signature().is_err());

        let mut parser = SignatureParser::new(&[0x17]);
        assert!(parser.parse_type().is_err());

        // trailing data
        let mut parser = SignatureParser::new(&[0x06, 0x08, 0x00]);
        parser.parse_field_signature().unwrap();
        assert!(parser.finish().is_err());
    }

    #[test]
    fn recursion_limit() {
        let mut data = vec![0x0F; MAX_RECURSION_DEPTH + 1];
        data.push(0x08);

        let mut parser = SignatureParser::new(&data);
        assert!(matches!(
            parser.parse_type(),
            Err(crate::Error::RecursionLimit(_))
        ));

        // depth is released after each nested type
        let mut wide = vec![0x15, 0x12, 0x2A, 0x40];
        wide.extend(std::iter::repeat(0x08).take(0x40));
        let mut parser = SignatureParser::new(&wide);
        assert!(parser.parse_type().is_ok());
    }
}
