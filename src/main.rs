#![no_main]
#![no_std]

use defmt_rtt as _;
use panic_probe as _;

#[rtic::app(device = stm32g0xx_hal::stm32, peripherals = true)]
mod app {
    use chronograph::hw::{
        init_clock, init_lcd, Adc, AckButton, AckIrq, GateTimer, HwBoard, LcdInterface,
        OverflowIrq, StatusLeds, ACK_LINE, GATE_TIMER_PRESCALER,
    };
    use chronograph::{Board, TextLcd, ACK, OVERFLOWS};
    use stm32g0xx_hal::delay::DelayExt;
    use stm32g0xx_hal::exti::SignalEdge;
    use stm32g0xx_hal::gpio::{GpioExt, Speed};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        board: Option<HwBoard>,
        overflow_irq: OverflowIrq,
        ack_irq: AckIrq,
    }

    #[init]
    fn init(cx: init::Context) -> (Shared, Local, init::Monotonics) {
        let core = cx.core;
        let mut device = cx.device;

        // Clock
        let mut rcc = init_clock(device.RCC);
        let mut delay = core.SYST.delay(&mut rcc);

        // GPIO
        let gpioa = device.GPIOA.split(&mut rcc);
        let gpiob = device.GPIOB.split(&mut rcc);
        let gpioc = device.GPIOC.split(&mut rcc);

        // LCD
        let interface = LcdInterface::new(
            gpiob.pb0.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb1.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb2.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb3.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb4.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb5.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb6.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb7.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb8.into_push_pull_output().set_speed(Speed::VeryHigh),
            gpiob.pb9.into_push_pull_output().set_speed(Speed::VeryHigh),
        );
        let lcd = init_lcd(
            interface,
            gpioa.pa4.into_push_pull_output(),
            gpioa.pa5.into_push_pull_output(),
            &mut delay,
        )
        .unwrap();
        let display = TextLcd::new(lcd).unwrap();

        // Gates
        let adc = Adc::new(device.ADC, gpioa.pa0, gpioa.pa1, &mut rcc, &mut delay);
        let counter = GateTimer::new(device.TIM3, GATE_TIMER_PRESCALER, &mut rcc);
        let overflow_irq = counter.irq();

        // Operator
        let button = gpioc
            .pc13
            .into_pull_up_input()
            .listen(SignalEdge::Falling, &mut device.EXTI);
        let (ack, ack_irq) = AckButton::new(button, ACK_LINE);
        let indicator = StatusLeds::new(
            gpioc.pc6.into_push_pull_output(),
            gpioc.pc7.into_push_pull_output(),
        );

        defmt::info!("board ready");

        let board = Board {
            adc,
            counter,
            display,
            ack,
            indicator,
            delay,
        };
        (
            Shared {},
            Local {
                board: Some(board),
                overflow_irq,
                ack_irq,
            },
            init::Monotonics(),
        )
    }

    #[idle(local = [board])]
    fn idle(cx: idle::Context) -> ! {
        let board = cx.local.board.take().unwrap();

        #[cfg(not(feature = "raw-monitor"))]
        let never = {
            use chronograph::{Config, MeasurementStateMachine};

            let mut machine =
                MeasurementStateMachine::start(Config::DEFAULT, board, &OVERFLOWS, &ACK).unwrap();
            machine.run().unwrap()
        };

        #[cfg(feature = "raw-monitor")]
        let never = {
            use chronograph::{Channel, RawMonitor};

            defmt::info!("raw monitor");
            let mut monitor =
                RawMonitor::new(board.adc, board.display, board.delay, Channel::Front);
            monitor.run().unwrap()
        };

        match never {}
    }

    #[task(binds = TIM3, priority = 2, local = [overflow_irq])]
    fn tim3(cx: tim3::Context) {
        cx.local.overflow_irq.unpend();
        OVERFLOWS.record();
    }

    #[task(binds = EXTI4_15, priority = 1, local = [ack_irq])]
    fn exti(cx: exti::Context) {
        cx.local.ack_irq.on_edge(&ACK);
    }
}
